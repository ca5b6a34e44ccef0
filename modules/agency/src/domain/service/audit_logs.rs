use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::Principal;
use tracing::instrument;

use super::{ADMIN, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::AuditEntry;
use crate::infra::storage::entity::audit_log;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    pub entity: Option<String>,
    pub action: Option<String>,
}

/// Read access to the audit trail. Admin only.
pub struct AuditLogsService {
    deps: Arc<ServiceDeps>,
}

impl AuditLogsService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &AuditLogFilter,
        page: &Page,
    ) -> Result<Paged<AuditEntry>, DomainError> {
        require_role(principal, ADMIN)?;
        let filters = FilterSet::new()
            .eq("entity", audit_log::Column::Entity, non_blank(filter.entity.as_deref()))
            .eq("action", audit_log::Column::Action, non_blank(filter.action.as_deref()));
        let paged = self
            .deps
            .list::<audit_log::Entity>(principal, &filters, page)
            .await?;
        Ok(paged.map(AuditEntry::from))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
