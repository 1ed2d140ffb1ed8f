use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failures of write operations, with SQL constraint violations split out so
/// callers can report them separately from connectivity problems.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::UniqueViolation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ForeignKeyViolation(msg),
            _ => Self::Database(err),
        }
    }
}

impl StoreError {
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation(_) | Self::ForeignKeyViolation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_errors_stay_database_errors() {
        let err = StoreError::from(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, StoreError::Database(_)));
        assert!(!err.is_constraint_violation());
        assert_eq!(err.to_string(), "Custom Error: connection reset");
    }
}
