//! Error types for the cache layer.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors a cache backend can report.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the request.
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
