//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// No key configured, or the configured passphrase is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Tag did not verify, or the envelope is malformed or of the other mode.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The cipher refused to encrypt.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Hashing or hash parsing failed.
    #[error("hashing failed: {0}")]
    Hashing(String),

    /// Decrypted bytes are not the UTF-8 text the caller asked for.
    #[error("invalid UTF-8 in plaintext: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
