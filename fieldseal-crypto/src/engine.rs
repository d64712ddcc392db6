//! The field crypto engine handed to pipelines.
//!
//! Stateless apart from the immutable key and hash cost, so one instance can
//! be shared by every resource and every concurrent invocation.

use crate::cipher::{self, Envelope, Mode};
use crate::error::{CryptoError, CryptoResult};
use crate::hash::{self, HashParams};
use crate::key::EncryptionKey;

#[derive(Clone, Debug, Default)]
pub struct FieldCrypto {
    key: Option<EncryptionKey>,
    hash_params: HashParams,
}

impl FieldCrypto {
    /// An engine with a key derived from `passphrase`.
    pub fn with_passphrase(passphrase: &str) -> CryptoResult<Self> {
        Ok(Self {
            key: Some(EncryptionKey::from_passphrase(passphrase)?),
            hash_params: HashParams::default(),
        })
    }

    /// An engine without a key. Hashing works; encryption fails with
    /// [`CryptoError::Configuration`].
    pub fn without_key() -> Self {
        Self::default()
    }

    /// Replaces the hash cost parameters.
    pub fn with_hash_params(mut self, params: HashParams) -> Self {
        self.hash_params = params;
        self
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn hash_params(&self) -> &HashParams {
        &self.hash_params
    }

    fn key(&self) -> CryptoResult<&EncryptionKey> {
        self.key
            .as_ref()
            .ok_or_else(|| CryptoError::Configuration("no encryption key configured".into()))
    }

    pub fn encrypt(&self, plaintext: &[u8], deterministic: bool) -> CryptoResult<Envelope> {
        cipher::encrypt(self.key()?, plaintext, Mode::from_deterministic(deterministic))
    }

    pub fn decrypt(&self, envelope: &str, deterministic: bool) -> CryptoResult<Vec<u8>> {
        let key = self.key()?;
        let envelope = Envelope::parse(envelope, Mode::from_deterministic(deterministic))?;
        cipher::decrypt(key, &envelope)
    }

    /// Encrypts a string field value into envelope text.
    pub fn encrypt_str(&self, plaintext: &str, deterministic: bool) -> CryptoResult<String> {
        cipher::encrypt_string(self.key()?, plaintext, Mode::from_deterministic(deterministic))
    }

    /// Decrypts envelope text back into the string field value.
    pub fn decrypt_str(&self, envelope: &str, deterministic: bool) -> CryptoResult<String> {
        cipher::decrypt_string(self.key()?, envelope, Mode::from_deterministic(deterministic))
    }

    pub fn hash(&self, plaintext: &[u8]) -> CryptoResult<String> {
        hash::hash(plaintext, &self.hash_params)
    }

    pub fn verify(&self, plaintext: &[u8], hashed: &str) -> CryptoResult<bool> {
        hash::verify(plaintext, hashed)
    }
}
