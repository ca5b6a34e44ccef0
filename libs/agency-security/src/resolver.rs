//! Scope resolution: (principal, resource kind) to [`ScopePredicate`].
//!
//! [`scope_for`] holds the role table and is pure. [`ScopeResolver`] adds
//! the one storage round trip the table needs: mapping a client principal's
//! email to its client record.

use std::sync::Arc;

use async_trait::async_trait;

use crate::principal::{Principal, Role};
use crate::resource::ResourceKind;
use crate::scope::ScopePredicate;

pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Maps a client principal's email to its client record id.
#[async_trait]
pub trait ClientLookup: Send + Sync {
    /// Returns `Ok(None)` when no client record has this email.
    async fn client_id_by_email(&self, email: &str) -> Result<Option<i64>, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("client lookup failed: {0}")]
    Lookup(#[source] LookupError),
}

/// Role table for one resource kind.
///
/// `client_id` is the caller's linked client record, only consulted for
/// `Role::Client` on portfolio kinds. Missing links always resolve to
/// `Denied`.
#[must_use]
pub fn scope_for(
    principal: &Principal,
    kind: ResourceKind,
    client_id: Option<i64>,
) -> ScopePredicate {
    match (principal.role(), kind) {
        (Role::Admin, _) => ScopePredicate::Unrestricted,
        (Role::Agent | Role::Client, ResourceKind::AuditLog)
        | (Role::Client, ResourceKind::Agent) => ScopePredicate::Denied,
        (Role::Agent | Role::Client, ResourceKind::Branch | ResourceKind::InsuranceType) => {
            ScopePredicate::Unrestricted
        }
        (Role::Agent, ResourceKind::Agent) => {
            if principal.agent_id().is_some() {
                ScopePredicate::Unrestricted
            } else {
                ScopePredicate::Denied
            }
        }
        (
            Role::Agent,
            ResourceKind::Client | ResourceKind::Contract | ResourceKind::InsuranceCase,
        ) => ScopePredicate::for_agent(principal.agent_id()),
        (
            Role::Client,
            ResourceKind::Client | ResourceKind::Contract | ResourceKind::InsuranceCase,
        ) => ScopePredicate::for_client(client_id),
    }
}

/// Resolves scopes for every request of a service.
///
/// Constructed once with its lookup collaborator; cheap to clone.
#[derive(Clone)]
pub struct ScopeResolver {
    lookup: Arc<dyn ClientLookup>,
}

impl std::fmt::Debug for ScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeResolver").finish_non_exhaustive()
    }
}

impl ScopeResolver {
    #[must_use]
    pub fn new(lookup: Arc<dyn ClientLookup>) -> Self {
        Self { lookup }
    }

    /// Resolves the scope of `principal` over `kind`.
    ///
    /// "No matching client" is a normal `Denied` outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Lookup`] if the client lookup itself fails.
    pub async fn resolve(
        &self,
        principal: &Principal,
        kind: ResourceKind,
    ) -> Result<ScopePredicate, ResolveError> {
        let client_id = if principal.role() == Role::Client && kind.is_portfolio() {
            self.client_id_of(principal).await?
        } else {
            None
        };

        let scope = scope_for(principal, kind, client_id);
        if scope.is_denied() {
            tracing::debug!(
                user_id = principal.user_id(),
                role = %principal.role(),
                %kind,
                "scope resolved to denied"
            );
        }
        Ok(scope)
    }

    /// Linked client record of a client principal.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Lookup`] if the lookup fails.
    pub async fn client_id_of(&self, principal: &Principal) -> Result<Option<i64>, ResolveError> {
        self.lookup
            .client_id_by_email(principal.email())
            .await
            .map_err(ResolveError::Lookup)
    }
}
