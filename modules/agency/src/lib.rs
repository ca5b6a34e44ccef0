#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Insurance agency back end.
//!
//! - [`domain`]: business services behind a role allowlist and row scoping.
//! - [`infra`]: sea-orm entities, migrations and the storage-backed
//!   collaborators of the domain.
//! - [`auth`]: password hashing, bearer tokens and the request middleware.
//! - [`api`]: the axum REST surface.
//! - [`config`]: configuration of the whole application.

use std::sync::Arc;

use agency_db::Db;
use agency_security::ScopeResolver;
use axum::Router;

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::AppConfig;

use crate::auth::{TokenError, TokenService};
use crate::domain::service::AppServices;
use crate::infra::storage::{OrmAuditSink, OrmClientLookup};

/// Wires the domain services over `db`.
///
/// # Errors
///
/// Returns [`TokenError::WeakSecret`] when `auth.jwt_secret` is too short.
pub fn build_services(db: Db, config: &AppConfig) -> Result<Arc<AppServices>, TokenError> {
    let tokens = TokenService::new(&config.auth)?;
    let scopes = ScopeResolver::new(Arc::new(OrmClientLookup::new(db.clone())));
    let audit = Arc::new(OrmAuditSink::new(db.clone()));
    Ok(Arc::new(AppServices::new(
        db,
        scopes,
        audit,
        tokens,
        config.services(),
    )))
}

/// The HTTP application over already wired services.
#[must_use]
pub fn build_router(services: Arc<AppServices>, config: &AppConfig) -> Router {
    api::rest::router(services, config.server.request_timeout())
}
