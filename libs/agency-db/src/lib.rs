#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Query layer for role-scoped resources.
//!
//! - [`secure`]: per-entity descriptors, scope conditions, filter sets and
//!   the list/count query pair built from them.
//! - [`page`]: offset pagination and the response envelope.
//! - [`Db`]: the injected connection pool handle.

pub mod config;
pub mod error;
pub mod page;
pub mod secure;

pub use config::{Db, DbConfig, connect_db};
pub use error::DbError;
pub use page::{Page, PageLimits, Paged, PaginationEnvelope};
