use agency_db::Db;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use super::entity::audit_log;
use crate::domain::error::DomainError;
use crate::domain::ports::{AuditEvent, AuditSink};

/// Writes audit events into the `audit_log` table.
#[derive(Clone, Debug)]
pub struct OrmAuditSink {
    db: Db,
}

impl OrmAuditSink {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for OrmAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), DomainError> {
        let row = audit_log::ActiveModel {
            entity: Set(event.entity.to_owned()),
            entity_id: Set(event.entity_id),
            action: Set(event.action.as_str().to_owned()),
            changed_by: Set(Some(event.changed_by)),
            changed_at: Set(Utc::now()),
            payload: Set(event.payload),
            ..Default::default()
        };
        row.insert(self.db.conn()).await?;
        Ok(())
    }
}
