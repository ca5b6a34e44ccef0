pub mod error;
pub mod models;
pub mod ports;
// Every service operation fails with the `DomainError` kinds listed in
// `service`'s module docs.
#[allow(clippy::missing_errors_doc)]
pub mod service;
pub mod validate;
