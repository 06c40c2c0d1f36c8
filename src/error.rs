//! Error Types

use thiserror::Error;

/// Errors returned by `SaferDb` operations
#[derive(Error, Debug)]
pub enum DbError {
    /// Caller-supplied arguments were rejected before anything was sent to the database
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error reported by the database driver, surfaced unmodified
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    /// Shorthand for building an `InvalidArgument` error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DbError::InvalidArgument(message.into())
    }

    /// Whether this error was raised by argument validation
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DbError::InvalidArgument(_))
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
