//! Mapping raw hook and store failures onto [`PipelineError`].

use crate::error::PipelineError;
use fieldseal_cache::CacheError;
use fieldseal_crypto::CryptoError;
use fieldseal_model::ModelError;
use fieldseal_storage::StorageError;
use thiserror::Error;

/// A failure raised inside the pipeline before normalization.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Params(#[from] fieldseal_types::Error),

    /// Already part of the taxonomy; passes through unchanged.
    #[error(transparent)]
    Normalized(#[from] PipelineError),
}

/// Normalizes `error`.
///
/// Store "not found" becomes [`PipelineError::NotFound`], key and ciphertext
/// failures keep their class, bad parameters become
/// [`PipelineError::Validation`], and everything else is wrapped as
/// [`PipelineError::Internal`].
pub fn normalize(error: HookError) -> PipelineError {
    match error {
        HookError::Normalized(err) => err,
        HookError::Storage(StorageError::NotFound(message)) => PipelineError::NotFound { message },
        HookError::Crypto(CryptoError::Configuration(message)) => {
            PipelineError::Configuration(message)
        }
        HookError::Crypto(CryptoError::Authentication(message)) => {
            PipelineError::Authentication(message)
        }
        HookError::Params(err) => PipelineError::Validation(err.to_string()),
        HookError::Model(err) => PipelineError::Configuration(err.to_string()),
        HookError::Storage(err) => PipelineError::internal(err),
        HookError::Crypto(err) => PipelineError::internal(err),
        HookError::Cache(err) => PipelineError::internal(err),
    }
}

impl From<HookError> for PipelineError {
    fn from(error: HookError) -> Self {
        normalize(error)
    }
}
