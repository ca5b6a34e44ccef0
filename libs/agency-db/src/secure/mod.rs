//! Scoped query construction.
//!
//! An entity opts in by implementing [`ScopableEntity`], a small declarative
//! descriptor: base query, owning columns, fixed sort. Everything else is
//! generic and written once:
//!
//! 1. [`build_scope_condition`] compiles a [`ScopePredicate`] into a
//!    `SeaORM` condition, or `None` for a denied scope.
//! 2. [`FilterSet`] collects the caller's optional filters as parameterized
//!    conditions in a fixed order.
//! 3. [`build_queries`] merges both into a [`QueryPlan`]: either `Empty`, or
//!    one filtered select from which the list and count queries are derived.
//! 4. [`fetch_page`] executes the plan.
//!
//! [`ScopePredicate`]: agency_security::ScopePredicate

mod cond;
mod entity;
mod filter;
mod ops;
mod query;

pub use cond::build_scope_condition;
pub use entity::ScopableEntity;
pub use filter::FilterSet;
pub use ops::{count_scoped, fetch_page, find_scoped};
pub use query::{QueryPlan, ScopedSelect, build_queries};
