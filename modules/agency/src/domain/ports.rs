//! Outbound collaborators of the domain services.

use async_trait::async_trait;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

/// A mutation performed by an authenticated user.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub entity: &'static str,
    pub entity_id: i64,
    pub action: AuditAction,
    pub changed_by: i64,
    pub payload: Option<serde_json::Value>,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), DomainError>;
}
