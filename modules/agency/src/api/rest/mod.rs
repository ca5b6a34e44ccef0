//! HTTP surface under `/api/v1`.
//!
//! Handlers parse raw path, query and body input, call one service method
//! with the request's [`Principal`](agency_security::Principal) and shape
//! the result. Every failure leaves through [`error::ApiError`].

pub mod error;
mod handlers;
pub mod query;
pub mod routes;

pub use error::{ApiError, ApiJson, ApiQuery, ApiResult};
pub use routes::router;
