//! Encryption key derivation.
//!
//! The field key is the SHA-256 digest of the configured passphrase. The same
//! passphrase therefore always yields the same key, which deterministic
//! envelopes depend on across restarts.

use crate::error::{CryptoError, CryptoResult};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// A field encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Derives the key from a passphrase.
    ///
    /// An empty passphrase is rejected as a configuration error.
    pub fn from_passphrase(passphrase: &str) -> CryptoResult<Self> {
        if passphrase.is_empty() {
            return Err(CryptoError::Configuration(
                "encryption passphrase is empty".to_string(),
            ));
        }

        let digest = Sha256::digest(passphrase.as_bytes());
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&digest);
        Ok(Self { bytes })
    }

    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
