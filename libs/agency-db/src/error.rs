use sea_orm::{DbErr, SqlErr};

/// Storage failure, with constraint violations split out so callers can
/// report them as bad input instead of internal errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("invalid database configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Sea(DbErr),
}

impl DbError {
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_) | Self::ForeignKeyViolation(_))
    }
}

impl From<DbErr> for DbError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::UniqueViolation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ForeignKeyViolation(msg),
            _ => Self::Sea(err),
        }
    }
}
