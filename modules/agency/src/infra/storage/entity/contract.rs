use std::str::FromStr;

use agency_db::secure::ScopableEntity;
use agency_security::ResourceKind;
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, Order};
use serde::{Deserialize, Serialize};

/// Contract lifecycle status. New contracts start as `Draft`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ContractStatus {
    #[default]
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Suspended")]
    Suspended,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 5] = [
        ContractStatus::Draft,
        ContractStatus::Active,
        ContractStatus::Suspended,
        ContractStatus::Cancelled,
        ContractStatus::Completed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Draft => "Draft",
            ContractStatus::Active => "Active",
            ContractStatus::Suspended => "Suspended",
            ContractStatus::Cancelled => "Cancelled",
            ContractStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contract status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for ContractStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| StatusParseError(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contract")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(indexed)]
    pub client_id: i64,
    #[sea_orm(indexed)]
    pub agent_id: i64,
    pub insurance_type_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub insurance_amount: f64,
    pub contribution_amount: f64,
    pub agent_percent: f64,
    pub status: ContractStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::agent::Entity",
        from = "Column::AgentId",
        to = "super::agent::Column::Id"
    )]
    Agent,
    #[sea_orm(
        belongs_to = "super::insurance_type::Entity",
        from = "Column::InsuranceTypeId",
        to = "super::insurance_type::Column::Id"
    )]
    InsuranceType,
    #[sea_orm(has_many = "super::insurance_case::Entity")]
    Cases,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl Related<super::insurance_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InsuranceType.def()
    }
}

impl Related<super::insurance_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const KIND: ResourceKind = ResourceKind::Contract;

    fn id_col() -> Self::Column {
        Column::Id
    }

    fn sort() -> Vec<(Self::Column, Order)> {
        vec![(Column::Id, Order::Desc)]
    }

    fn agent_condition(agent_id: i64) -> Option<Condition> {
        Some(Condition::all().add(Column::AgentId.eq(agent_id)))
    }

    fn client_condition(client_id: i64) -> Option<Condition> {
        Some(Condition::all().add(Column::ClientId.eq(client_id)))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn status_parses_its_display_form() {
        for status in ContractStatus::ALL {
            assert_eq!(status.as_str().parse::<ContractStatus>(), Ok(status));
        }
        assert!("active".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_its_name() {
        assert_eq!(
            serde_json::to_string(&ContractStatus::Suspended).unwrap(),
            "\"Suspended\""
        );
    }
}
