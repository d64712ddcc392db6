//! One-way hashing of designated fields using Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`) that embed their salt and
//! cost, so verification needs nothing but the stored value.

use crate::error::{CryptoError, CryptoResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

/// Size of the per-hash salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Argon2id cost parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl HashParams {
    fn hasher(&self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes plaintext with a fresh random salt.
pub fn hash(plaintext: &[u8], params: &HashParams) -> CryptoResult<String> {
    let mut salt_bytes = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CryptoError::Hashing(e.to_string()))?;

    let hashed = params
        .hasher()?
        .hash_password(plaintext, &salt)
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
    Ok(hashed.to_string())
}

/// Checks plaintext against a stored hash.
///
/// Returns `Ok(false)` on mismatch and an error only when `hashed` is not a
/// parseable hash string.
pub fn verify(plaintext: &[u8], hashed: &str) -> CryptoResult<bool> {
    let parsed = PasswordHash::new(hashed).map_err(|e| CryptoError::Hashing(e.to_string()))?;
    Ok(Argon2::default().verify_password(plaintext, &parsed).is_ok())
}
