//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool exhausted: no connection available within {timeout_ms}ms")]
    PoolExhausted { timeout_ms: u64 },

    #[error("Storage unreachable: {0}")]
    Connectivity(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Referenced row does not exist: {0}")]
    ForeignKeyViolation(String),

    #[error("A user with external identity {0} already exists")]
    DuplicateIdentity(i64),

    #[error("Invalid amount: {0} (amounts must be non-negative)")]
    InvalidAmount(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Unknown user with external identity {0}")]
    UnknownUser(i64),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Whether the caller may retry the operation with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::PoolExhausted { .. } | Error::Connectivity(_))
    }

    /// Whether the error was caused by caller input rather than the storage layer.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ForeignKeyViolation(_)
                | Error::DuplicateIdentity(_)
                | Error::InvalidAmount(_)
                | Error::InvalidPeriod(_)
                | Error::InvalidName(_)
                | Error::UnknownUser(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::PoolExhausted { timeout_ms: 10 }.is_retryable());
        assert!(Error::Connectivity("down".into()).is_retryable());
        assert!(!Error::InvalidAmount("-1".into()).is_retryable());
        assert!(!Error::Schema("bad".into()).is_retryable());
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::DuplicateIdentity(7).is_validation());
        assert!(Error::InvalidPeriod("month 13".into()).is_validation());
        assert!(!Error::PoolExhausted { timeout_ms: 10 }.is_validation());
    }
}
