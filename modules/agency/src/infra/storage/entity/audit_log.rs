use agency_db::secure::ScopableEntity;
use agency_security::ResourceKind;
use sea_orm::Order;
use sea_orm::entity::prelude::*;

/// One recorded mutation. `payload` holds the submitted fields.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub entity: String,
    pub entity_id: i64,
    pub action: String,
    pub changed_by: Option<i64>,
    #[sea_orm(indexed)]
    pub changed_at: DateTimeUtc,
    pub payload: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const KIND: ResourceKind = ResourceKind::AuditLog;

    fn id_col() -> Self::Column {
        Column::Id
    }

    fn sort() -> Vec<(Self::Column, Order)> {
        vec![(Column::ChangedAt, Order::Desc), (Column::Id, Order::Desc)]
    }
}
