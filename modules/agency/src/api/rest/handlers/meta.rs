use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::api::rest::error::ApiError;
use crate::domain::models::StatusOptions;

/// Liveness probe. Does not touch the database.
#[allow(clippy::unused_async)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Contract statuses and roles accepted by the API.
#[allow(clippy::unused_async)]
pub async fn status_options() -> Json<StatusOptions> {
    Json(StatusOptions::default())
}

/// Fallback for unknown paths.
#[allow(clippy::unused_async)]
pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Endpoint not found")
}
