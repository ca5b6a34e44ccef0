use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::domain::error::DomainError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error response: `{ "error": { code, message, details } }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: Body<'a>,
}

#[derive(Serialize)]
struct Body<'a> {
    code: &'a str,
    message: &'a str,
    details: &'a Value,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            error: Body {
                code: self.code,
                message: &self.message,
                details: &self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation {
                message,
                violations,
            } => {
                let err = Self::new(StatusCode::BAD_REQUEST, "VALIDATION", message);
                if violations.is_empty() {
                    err
                } else {
                    err.with_details(serde_json::to_value(violations).unwrap_or_default())
                }
            }
            DomainError::Unauthenticated(message) => {
                tracing::debug!("AuthN rejected: {message}");
                Self::new(StatusCode::UNAUTHORIZED, "AUTH", message)
            }
            DomainError::Forbidden(message) => {
                tracing::debug!("Access denied: {message}");
                Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
            }
            e @ DomainError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            DomainError::StorageConflict { message, detail } => {
                tracing::debug!(%detail, "{message}");
                Self::new(StatusCode::BAD_REQUEST, "DB_CONSTRAINT", message)
            }
            DomainError::Internal(cause) => {
                tracing::error!(error = %cause, "Internal error while handling request");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION", rejection.body_text())
    }
}

/// `axum::Json` whose rejection uses the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejection uses the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::error::FieldViolation;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tracing_test::traced_test;

    async fn render(err: DomainError) -> (StatusCode, Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_the_rejected_fields() {
        let (status, body) = render(DomainError::invalid(vec![FieldViolation::new(
            "email",
            "Invalid email",
        )]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": {
                "code": "VALIDATION",
                "message": "Validation failed",
                "details": [{"field": "email", "message": "Invalid email"}]
            }})
        );
    }

    #[tokio::test]
    async fn each_kind_maps_to_its_status_and_code() {
        let cases = [
            (DomainError::unauthenticated("nope"), StatusCode::UNAUTHORIZED, "AUTH"),
            (DomainError::insufficient_permissions(), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (DomainError::not_found("Contract", 9), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (DomainError::bad_request("No fields to update"), StatusCode::BAD_REQUEST, "VALIDATION"),
            (
                DomainError::StorageConflict {
                    message: "Unique constraint violation".to_owned(),
                    detail: "UNIQUE constraint failed: branch.name".to_owned(),
                },
                StatusCode::BAD_REQUEST,
                "DB_CONSTRAINT",
            ),
        ];
        for (err, expected_status, expected_code) in cases {
            let (status, body) = render(err).await;
            assert_eq!(status, expected_status);
            assert_eq!(body["error"]["code"], expected_code);
            assert_eq!(body["error"]["details"], json!({}));
        }
    }

    #[tokio::test]
    async fn constraint_detail_is_not_exposed() {
        let (_, body) = render(DomainError::StorageConflict {
            message: "Foreign key constraint violation".to_owned(),
            detail: "FOREIGN KEY constraint failed".to_owned(),
        })
        .await;
        assert_eq!(body["error"]["message"], "Foreign key constraint violation");
    }

    #[tokio::test]
    #[traced_test]
    async fn internal_errors_hide_the_cause() {
        let (status, body) = render(DomainError::internal("connection reset by peer")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(logs_contain("connection reset by peer"));
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (_, body) = render(DomainError::not_found("Client", 3)).await;
        assert_eq!(body["error"]["message"], "Client not found");
    }
}
