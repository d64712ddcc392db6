//! The normalized error taxonomy returned to callers.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Every failure leaving the pipeline is one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing key, invalid resource configuration or unknown resource.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A ciphertext failed authentication: tampered, truncated or read in
    /// the wrong mode.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The store found no row where one was required.
    #[error("{message}")]
    NotFound { message: String },

    /// Operation parameters are missing or malformed.
    #[error("invalid parameters: {0}")]
    Validation(String),

    /// Anything else, carrying the original failure.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl PipelineError {
    pub fn not_found(message: impl Into<String>) -> Self {
        PipelineError::NotFound {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary failure, keeping its message.
    pub fn internal(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        PipelineError::Internal {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP-style status.
    pub const fn status(&self) -> u16 {
        match self {
            PipelineError::Configuration(_) | PipelineError::Internal { .. } => 500,
            PipelineError::Authentication(_) => 400,
            PipelineError::NotFound { .. } => 404,
            PipelineError::Validation(_) => 422,
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
            PipelineError::Authentication(_) => "AUTHENTICATION_FAILED",
            PipelineError::NotFound { .. } => "NOT_FOUND",
            PipelineError::Validation(_) => "VALIDATION_ERROR",
            PipelineError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::NotFound { .. })
    }
}
