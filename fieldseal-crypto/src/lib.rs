//! Field-level encryption for fieldseal.
//!
//! This crate provides:
//! - Key derivation from a configured passphrase (SHA-256)
//! - AES-256-GCM envelopes in random and deterministic mode
//! - One-way Argon2id hashing with verification
//!
//! # Envelope format
//!
//! Envelopes are self-describing text, hex parts joined by `:`:
//!
//! - Random mode: `iv:tag:ciphertext`
//! - Deterministic mode: `tag:ciphertext` (IV is sixteen zero bytes)
//!
//! An envelope only decrypts in the mode it was written in.
//!
//! # Security Model
//!
//! - Every envelope is authenticated; tampering with IV, tag or ciphertext
//!   fails decryption instead of yielding wrong plaintext
//! - Keys are zeroized on drop
//! - Deterministic mode trades confidentiality for equality lookups

mod cipher;
mod engine;
mod error;
mod hash;
mod key;

pub use cipher::{
    decrypt, decrypt_string, encrypt, encrypt_string, Envelope, Mode, IV_SIZE, TAG_SIZE,
};
pub use engine::FieldCrypto;
pub use error::{CryptoError, CryptoResult};
pub use hash::{hash, verify, HashParams, SALT_SIZE};
pub use key::{EncryptionKey, KEY_SIZE};
