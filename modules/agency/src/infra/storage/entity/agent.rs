use agency_db::secure::ScopableEntity;
use agency_security::ResourceKind;
use sea_orm::Order;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "agent")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hire_date: Date,
    pub branch_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    #[sea_orm(has_many = "super::contract::Entity")]
    Contracts,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const KIND: ResourceKind = ResourceKind::Agent;

    fn id_col() -> Self::Column {
        Column::Id
    }

    fn sort() -> Vec<(Self::Column, Order)> {
        vec![(Column::Id, Order::Desc)]
    }
}
