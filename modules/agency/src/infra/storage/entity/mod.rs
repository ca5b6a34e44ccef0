//! `SeaORM` entities and their scoping descriptors.

pub mod agent;
pub mod audit_log;
pub mod branch;
pub mod client;
pub mod contract;
pub mod insurance_case;
pub mod insurance_type;
pub mod user;
