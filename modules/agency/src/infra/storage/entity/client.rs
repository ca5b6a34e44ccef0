use agency_db::secure::ScopableEntity;
use agency_security::ResourceKind;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Query;
use sea_orm::{Condition, Order};

use super::contract;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "client")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contract::Entity")]
    Contracts,
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const KIND: ResourceKind = ResourceKind::Client;

    fn id_col() -> Self::Column {
        Column::Id
    }

    fn sort() -> Vec<(Self::Column, Order)> {
        vec![(Column::Id, Order::Desc)]
    }

    /// Clients with at least one contract handled by the agent.
    fn agent_condition(agent_id: i64) -> Option<Condition> {
        let portfolio = Query::select()
            .distinct()
            .column(contract::Column::ClientId)
            .from(contract::Entity)
            .and_where(contract::Column::AgentId.eq(agent_id))
            .to_owned();
        Some(Condition::all().add(Column::Id.in_subquery(portfolio)))
    }

    fn client_condition(client_id: i64) -> Option<Condition> {
        Some(Condition::all().add(Column::Id.eq(client_id)))
    }
}
