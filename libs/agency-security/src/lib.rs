#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Security primitives shared by the data layer and the HTTP surface.
//!
//! A request carries a [`Principal`]. The [`ScopeResolver`] turns the
//! principal and a [`ResourceKind`] into a [`ScopePredicate`], which the
//! query layer compiles into row filters and which
//! [`authorize_record_access`] evaluates against a single record.

pub mod decision;
pub mod principal;
pub mod resolver;
pub mod resource;
pub mod scope;

pub use decision::{AccessDecision, DenyReason, RecordOwner, authorize_record_access};
pub use principal::{Principal, Role, RoleParseError};
pub use resolver::{ClientLookup, LookupError, ResolveError, ScopeResolver, scope_for};
pub use resource::ResourceKind;
pub use scope::ScopePredicate;
