//! The cache backend boundary.

use crate::error::CacheResult;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// A key/value cache with pattern eviction.
///
/// Keys are namespaced `<resource>.<rest>`; [`CacheClient::clean`] takes a
/// glob pattern where `*` matches any run of characters.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Stores `value` under `key`; `None` means no expiry.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<()>;

    /// Evicts every key matching `pattern` and returns how many were removed.
    async fn clean(&self, pattern: &str) -> CacheResult<usize>;
}
