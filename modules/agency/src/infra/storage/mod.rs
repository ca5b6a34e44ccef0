//! `SeaORM` storage: entities, migrations and the collaborators the domain
//! consumes through traits.

mod audit;
mod client_lookup;
pub mod entity;
pub mod migrations;

pub use audit::OrmAuditSink;
pub use client_lookup::OrmClientLookup;
