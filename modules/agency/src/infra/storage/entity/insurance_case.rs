use agency_db::secure::ScopableEntity;
use agency_security::ResourceKind;
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, JoinType, Order, QuerySelect, Select};

use super::contract;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "insurance_case")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(indexed)]
    pub contract_id: i64,
    pub case_date: Date,
    pub act_number: String,
    pub damage_level: f64,
    pub accrued_payment: Option<f64>,
    pub accrued_date: Option<Date>,
    pub payment_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contract::Entity",
        from = "Column::ContractId",
        to = "super::contract::Column::Id"
    )]
    Contract,
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Cases are owned through their contract.
impl ScopableEntity for Entity {
    const KIND: ResourceKind = ResourceKind::InsuranceCase;

    fn id_col() -> Self::Column {
        Column::Id
    }

    fn sort() -> Vec<(Self::Column, Order)> {
        vec![(Column::Id, Order::Desc)]
    }

    fn base_query() -> Select<Self> {
        Entity::find().join(JoinType::InnerJoin, Relation::Contract.def())
    }

    fn agent_condition(agent_id: i64) -> Option<Condition> {
        Some(Condition::all().add(contract::Column::AgentId.eq(agent_id)))
    }

    fn client_condition(client_id: i64) -> Option<Condition> {
        Some(Condition::all().add(contract::Column::ClientId.eq(client_id)))
    }
}
