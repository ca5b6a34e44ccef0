//! Domain service layer.
//!
//! One service per resource. Every operation takes the request's
//! [`Principal`] and:
//! 1. checks the coarse role allowlist of the operation;
//! 2. resolves the principal's scope over the resource kind;
//! 3. reads through the scoped query engine, or, for writes to an existing
//!    record, prefetches it and evaluates an access decision;
//! 4. records an audit event after a successful mutation (best effort).
//!
//! Handlers never touch the database; they call service methods with
//! business parameters only.
//!
//! # Errors
//!
//! `Forbidden` when the role allowlist or a write decision rejects the
//! principal, `NotFound` for missing or out-of-scope records, `Validation`
//! for rejected input and `StorageConflict` for constraint violations.

use std::sync::Arc;

use agency_db::secure::{FilterSet, ScopableEntity, build_queries, fetch_page, find_scoped};
use agency_db::{Db, Page, PageLimits, Paged};
use agency_security::{
    DenyReason, Principal, RecordOwner, ResourceKind, Role, ScopePredicate, ScopeResolver,
    authorize_record_access,
};
use sea_orm::{ColumnTrait, ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::auth::TokenService;
use crate::domain::error::DomainError;
use crate::domain::ports::{AuditAction, AuditEvent, AuditSink};

mod agents;
mod audit_logs;
mod auth;
mod branches;
mod cases;
mod clients;
mod contracts;
mod insurance_types;
mod reports;

pub use agents::AgentsService;
pub use audit_logs::{AuditLogFilter, AuditLogsService};
pub use auth::AuthService;
pub use branches::BranchesService;
pub use cases::{CaseFilter, CasesService};
pub use clients::{ClientFilter, ClientsService};
pub use contracts::{ContractFilter, ContractsService};
pub use insurance_types::InsuranceTypesService;
pub use reports::ReportsService;

pub(crate) const ADMIN: &[Role] = &[Role::Admin];
pub(crate) const STAFF: &[Role] = &[Role::Admin, Role::Agent];
pub(crate) const ANYONE: &[Role] = &Role::ALL;

/// Configuration for the domain services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub pagination: PageLimits,
}

/// Collaborators shared by every service.
pub(crate) struct ServiceDeps {
    db: Db,
    scopes: ScopeResolver,
    audit: Arc<dyn AuditSink>,
}

impl ServiceDeps {
    pub(crate) fn conn(&self) -> &sea_orm::DatabaseConnection {
        self.db.conn()
    }

    pub(crate) async fn scope(
        &self,
        principal: &Principal,
        kind: ResourceKind,
    ) -> Result<ScopePredicate, DomainError> {
        Ok(self.scopes.resolve(principal, kind).await?)
    }

    /// Scoped, filtered page of `E`. A denied scope yields an empty page.
    pub(crate) async fn list<E>(
        &self,
        principal: &Principal,
        filters: &FilterSet,
        page: &Page,
    ) -> Result<Paged<E::Model>, DomainError>
    where
        E: ScopableEntity,
        E::Model: Send + Sync + 'static,
    {
        let scope = self.scope(principal, E::KIND).await?;
        let plan = build_queries::<E>(filters, &scope, self.conn().get_database_backend());
        let paged = fetch_page(self.conn(), &plan, page).await?;
        tracing::debug!(
            kind = %E::KIND,
            %scope,
            total = paged.pagination.total,
            rows = paged.data.len(),
            "listed records"
        );
        Ok(paged)
    }

    /// One record of `E` within the principal's scope. Missing and
    /// out-of-scope records are both `NotFound`.
    pub(crate) async fn get<E>(
        &self,
        principal: &Principal,
        entity: &'static str,
        id: i64,
    ) -> Result<E::Model, DomainError>
    where
        E: ScopableEntity,
    {
        let scope = self.scope(principal, E::KIND).await?;
        find_scoped::<E, _>(self.conn(), &scope, id)
            .await?
            .ok_or_else(|| DomainError::not_found(entity, id))
    }

    /// Prefetch for writes: the record regardless of scope.
    pub(crate) async fn fetch<E>(&self, entity: &'static str, id: i64) -> Result<E::Model, DomainError>
    where
        E: ScopableEntity,
    {
        find_scoped::<E, _>(self.conn(), &ScopePredicate::Unrestricted, id)
            .await?
            .ok_or_else(|| DomainError::not_found(entity, id))
    }

    /// Write guard for an existing record. A deny surfaces as `Forbidden`:
    /// the caller already named the record.
    pub(crate) async fn authorize_write(
        &self,
        principal: &Principal,
        kind: ResourceKind,
        entity: &'static str,
        owner: &RecordOwner,
    ) -> Result<(), DomainError> {
        let scope = self.scope(principal, kind).await?;
        authorize_record_access(principal, &scope, owner).or_else(|reason| match reason {
            DenyReason::NotInPortfolio => {
                DomainError::forbidden(format!("{entity} not in your portfolio"))
            }
            DenyReason::NotOwner | DenyReason::ScopeDenied => DomainError::forbidden("Access denied"),
        })
    }

    /// Deletes one record of `E` by id and audits it with its last state.
    pub(crate) async fn delete<E, T>(
        &self,
        principal: &Principal,
        entity: &'static str,
        id: i64,
    ) -> Result<(), DomainError>
    where
        E: ScopableEntity,
        T: From<E::Model> + Serialize,
    {
        let existing: T = self.fetch::<E>(entity, id).await?.into();
        let res = E::delete_many()
            .filter(E::id_col().eq(id))
            .exec(self.conn())
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found(entity, id));
        }
        self.audit(principal, entity, id, AuditAction::Delete, &existing)
            .await;
        tracing::info!(entity, id, "deleted record");
        Ok(())
    }

    /// Best-effort audit: failures are logged and swallowed.
    pub(crate) async fn audit<T: Serialize>(
        &self,
        principal: &Principal,
        entity: &'static str,
        entity_id: i64,
        action: AuditAction,
        state: &T,
    ) {
        let payload = match serde_json::to_value(state) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!("Audit payload serialization failed: {}", e);
                None
            }
        };
        let event = AuditEvent {
            entity,
            entity_id,
            action,
            changed_by: principal.user_id(),
            payload,
        };
        if let Err(e) = self.audit.record(event).await {
            tracing::debug!("Audit write failed (continuing): {}", e);
        }
    }
}

/// Coarse per-operation role allowlist.
pub(crate) fn require_role(principal: &Principal, roles: &[Role]) -> Result<(), DomainError> {
    if principal.has_any_role(roles) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = principal.user_id(),
            role = %principal.role(),
            "role not allowed for operation"
        );
        Err(DomainError::insufficient_permissions())
    }
}

/// The acting agent's id. An agent principal without one may not write.
pub(crate) fn acting_agent(principal: &Principal) -> Result<i64, DomainError> {
    principal
        .agent_id()
        .ok_or_else(|| DomainError::forbidden("Agent account is not linked to an agent"))
}

// DI container - aggregates all domain services.
pub struct AppServices {
    pub branches: BranchesService,
    pub agents: AgentsService,
    pub clients: ClientsService,
    pub insurance_types: InsuranceTypesService,
    pub contracts: ContractsService,
    pub cases: CasesService,
    pub audit_logs: AuditLogsService,
    pub reports: ReportsService,
    pub auth: AuthService,
    config: ServiceConfig,
}

impl AppServices {
    #[must_use]
    pub fn new(
        db: Db,
        scopes: ScopeResolver,
        audit: Arc<dyn AuditSink>,
        tokens: TokenService,
        config: ServiceConfig,
    ) -> Self {
        let deps = Arc::new(ServiceDeps {
            db,
            scopes,
            audit,
        });
        Self {
            branches: BranchesService::new(Arc::clone(&deps)),
            agents: AgentsService::new(Arc::clone(&deps)),
            clients: ClientsService::new(Arc::clone(&deps)),
            insurance_types: InsuranceTypesService::new(Arc::clone(&deps)),
            contracts: ContractsService::new(Arc::clone(&deps)),
            cases: CasesService::new(Arc::clone(&deps)),
            audit_logs: AuditLogsService::new(Arc::clone(&deps)),
            reports: ReportsService::new(Arc::clone(&deps)),
            auth: AuthService::new(deps, tokens),
            config,
        }
    }

    /// Page request from raw `page`/`limit` query values.
    #[must_use]
    pub fn page(&self, raw_page: Option<&str>, raw_limit: Option<&str>) -> Page {
        Page::parse_with(self.config.pagination, raw_page, raw_limit)
    }
}
