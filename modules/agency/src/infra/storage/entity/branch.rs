use agency_db::secure::ScopableEntity;
use agency_security::ResourceKind;
use sea_orm::Order;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "branch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::agent::Entity")]
    Agents,
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const KIND: ResourceKind = ResourceKind::Branch;

    fn id_col() -> Self::Column {
        Column::Id
    }

    fn sort() -> Vec<(Self::Column, Order)> {
        vec![(Column::Name, Order::Asc)]
    }
}
