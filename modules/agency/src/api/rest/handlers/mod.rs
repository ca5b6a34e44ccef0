//! Request handlers, one module per resource.

pub mod agents;
pub mod audit_logs;
pub mod auth;
pub mod branches;
pub mod cases;
pub mod clients;
pub mod contracts;
pub mod insurance_types;
pub mod meta;
pub mod reports;
