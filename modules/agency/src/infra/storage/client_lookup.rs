use agency_db::Db;
use agency_security::{ClientLookup, LookupError};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};

use super::entity::client;

/// Maps a login email to the client record carrying the same email.
#[derive(Clone, Debug)]
pub struct OrmClientLookup {
    db: Db,
}

impl OrmClientLookup {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClientLookup for OrmClientLookup {
    async fn client_id_by_email(&self, email: &str) -> Result<Option<i64>, LookupError> {
        let id = client::Entity::find()
            .select_only()
            .column(client::Column::Id)
            .filter(client::Column::Email.eq(email))
            .into_tuple::<i64>()
            .one(self.db.conn())
            .await?;
        Ok(id)
    }
}
