use agency_db::DbError;
use agency_security::ResolveError;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{message}")]
    Validation {
        message: String,
        violations: Vec<FieldViolation>,
    },

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{message}")]
    StorageConflict { message: String, detail: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// A single-field validation failure.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::invalid(vec![FieldViolation::new(field, message)])
    }

    #[must_use]
    pub fn invalid(violations: Vec<FieldViolation>) -> Self {
        Self::Validation {
            message: "Validation failed".to_owned(),
            violations,
        }
    }

    /// A validation failure not tied to a field.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            violations: Vec::new(),
        }
    }

    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    #[must_use]
    pub fn insufficient_permissions() -> Self {
        Self::Forbidden("Insufficient permissions".to_owned())
    }

    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<DbError> for DomainError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::UniqueViolation(detail) => Self::StorageConflict {
                message: "Unique constraint violation".to_owned(),
                detail,
            },
            DbError::ForeignKeyViolation(detail) => Self::StorageConflict {
                message: "Foreign key constraint violation".to_owned(),
                detail,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        DbError::from(e).into()
    }
}

impl From<ResolveError> for DomainError {
    fn from(e: ResolveError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_storage_conflict() {
        let err = DomainError::from(DbError::UniqueViolation("client.email".to_owned()));
        match err {
            DomainError::StorageConflict { message, detail } => {
                assert_eq!(message, "Unique constraint violation");
                assert_eq!(detail, "client.email");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn config_error_is_internal() {
        let err = DomainError::from(DbError::Config("bad url".to_owned()));
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(
            DomainError::not_found("Contract", 5).to_string(),
            "Contract not found"
        );
    }
}
