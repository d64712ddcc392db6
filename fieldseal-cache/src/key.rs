//! Cache key derivation for read results.

use crate::error::CacheResult;
use fieldseal_types::{Operation, OperationParams};
use sha2::{Digest, Sha256};

/// The eviction pattern covering every key of `resource`.
pub fn namespace_pattern(resource: &str) -> String {
    format!("{resource}.*")
}

/// `<resource>.<operation>:<sha256 hex of the serialized params>`.
///
/// Params serialize with sorted object keys, so equal parameters always
/// yield the same key.
pub fn cache_key(
    resource: &str,
    operation: Operation,
    params: &OperationParams,
) -> CacheResult<String> {
    let canonical = serde_json::to_vec(params)?;
    let digest = Sha256::digest(&canonical);
    Ok(format!("{resource}.{operation}:{}", hex::encode(digest)))
}
