//! Field encryption using AES-256-GCM with a 128-bit IV.
//!
//! Two modes share the cipher and differ only in where the IV comes from:
//!
//! - [`Mode::Random`]: a fresh random IV per call. Envelope text is
//!   `iv:tag:ciphertext`.
//! - [`Mode::Deterministic`]: the all-zero IV, so equal plaintexts under the
//!   same key produce equal envelopes and stored values can be matched by
//!   equality. Envelope text is `tag:ciphertext`; the IV is implicit.
//!
//! Deterministic envelopes reveal which stored values are equal. Fields that
//! never need equality lookups belong in random mode.

use crate::error::{CryptoError, CryptoResult};
use crate::key::EncryptionKey;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use rand::RngCore;
use std::fmt;

/// Size of the IV in bytes.
pub const IV_SIZE: usize = 16;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// IV used by deterministic envelopes.
const ZERO_IV: [u8; IV_SIZE] = [0u8; IV_SIZE];

type FieldCipher = AesGcm<Aes256, U16>;

/// How the IV of an envelope is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Random,
    Deterministic,
}

impl Mode {
    /// Maps the `deterministic` flag callers pass around.
    pub const fn from_deterministic(deterministic: bool) -> Self {
        if deterministic {
            Mode::Deterministic
        } else {
            Mode::Random
        }
    }

    pub const fn is_deterministic(&self) -> bool {
        matches!(self, Mode::Deterministic)
    }
}

/// An encrypted field value with everything needed to decrypt it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// `None` for deterministic envelopes (implicit zero IV).
    iv: Option<[u8; IV_SIZE]>,
    tag: [u8; TAG_SIZE],
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parses envelope text written in the given mode.
    ///
    /// Wrong part count, bad hex or wrong IV/tag lengths are reported as
    /// [`CryptoError::Authentication`]: a malformed envelope is treated the
    /// same as a forged one.
    pub fn parse(text: &str, mode: Mode) -> CryptoResult<Self> {
        let parts: Vec<&str> = text.split(':').collect();

        let (iv, tag, ciphertext) = match (mode, parts.as_slice()) {
            (Mode::Random, [iv, tag, ciphertext]) => {
                (Some(decode_fixed::<IV_SIZE>(iv, "iv")?), *tag, *ciphertext)
            }
            (Mode::Deterministic, [tag, ciphertext]) => (None, *tag, *ciphertext),
            _ => {
                return Err(CryptoError::Authentication(format!(
                    "malformed {} envelope: {} parts",
                    mode_name(mode),
                    parts.len()
                )));
            }
        };

        Ok(Self {
            iv,
            tag: decode_fixed::<TAG_SIZE>(tag, "tag")?,
            ciphertext: hex::decode(ciphertext)
                .map_err(|e| CryptoError::Authentication(format!("invalid ciphertext hex: {e}")))?,
        })
    }

    /// The mode this envelope was produced in.
    pub fn mode(&self) -> Mode {
        if self.iv.is_some() {
            Mode::Random
        } else {
            Mode::Deterministic
        }
    }

    /// The IV actually used by the cipher.
    pub fn iv(&self) -> [u8; IV_SIZE] {
        self.iv.unwrap_or(ZERO_IV)
    }

    pub fn tag(&self) -> &[u8; TAG_SIZE] {
        &self.tag
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(iv) = &self.iv {
            write!(f, "{}:", hex::encode(iv))?;
        }
        write!(f, "{}:{}", hex::encode(self.tag), hex::encode(&self.ciphertext))
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Random => "random",
        Mode::Deterministic => "deterministic",
    }
}

fn decode_fixed<const N: usize>(part: &str, what: &str) -> CryptoResult<[u8; N]> {
    let bytes = hex::decode(part)
        .map_err(|e| CryptoError::Authentication(format!("invalid {what} hex: {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        CryptoError::Authentication(format!(
            "invalid {what} length: expected {N}, got {}",
            bytes.len()
        ))
    })
}

/// Encrypts plaintext in the given mode.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8], mode: Mode) -> CryptoResult<Envelope> {
    let cipher = FieldCipher::new(key.as_bytes().into());

    let iv = match mode {
        Mode::Deterministic => ZERO_IV,
        Mode::Random => {
            let mut iv = [0u8; IV_SIZE];
            rand::rngs::OsRng.fill_bytes(&mut iv);
            iv
        }
    };

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(Envelope {
        iv: match mode {
            Mode::Random => Some(iv),
            Mode::Deterministic => None,
        },
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypts an envelope, verifying its tag.
pub fn decrypt(key: &EncryptionKey, envelope: &Envelope) -> CryptoResult<Vec<u8>> {
    let cipher = FieldCipher::new(key.as_bytes().into());
    let iv = envelope.iv();

    let mut buffer = envelope.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(&envelope.tag),
        )
        .map_err(|_| {
            CryptoError::Authentication("tag mismatch (wrong key, wrong mode or tampered data)".into())
        })?;

    Ok(buffer)
}

/// Encrypts a string and returns the envelope text.
pub fn encrypt_string(key: &EncryptionKey, plaintext: &str, mode: Mode) -> CryptoResult<String> {
    Ok(encrypt(key, plaintext.as_bytes(), mode)?.to_string())
}

/// Decrypts envelope text back into a string.
pub fn decrypt_string(key: &EncryptionKey, text: &str, mode: Mode) -> CryptoResult<String> {
    let envelope = Envelope::parse(text, mode)?;
    Ok(String::from_utf8(decrypt(key, &envelope)?)?)
}
