//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No row matched where one was required.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A uniqueness or immutability rule was violated.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The operation's parameters cannot be evaluated.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The store's connection lock was poisoned by a panicking holder.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Whether this is the store's "no matching row" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
