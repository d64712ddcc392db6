//! Namespace-wide cache eviction after mutations.
//!
//! Each namespace carries a generation that [`CacheInvalidator::break_cache`]
//! bumps. A read-through fill records the generation before it reads the
//! store and is dropped if an eviction happened in between, so a slow read
//! can never put a pre-mutation value back after the mutation's eviction.

use crate::client::CacheClient;
use crate::error::CacheResult;
use crate::key::namespace_pattern;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Evicts a resource's cached reads. Without a backend every call is a no-op.
///
/// Clones share the backend and the generation table.
#[derive(Clone, Default)]
pub struct CacheInvalidator {
    client: Option<Arc<dyn CacheClient>>,
    /// Fills hold the read side across check and set; evictions hold the
    /// write side across bump and clean.
    generations: Arc<RwLock<HashMap<String, u64>>>,
}

impl std::fmt::Debug for CacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheInvalidator")
            .field("configured", &self.client.is_some())
            .finish()
    }
}

impl CacheInvalidator {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self {
            client: Some(client),
            generations: Arc::default(),
        }
    }

    /// An invalidator with no backend.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&Arc<dyn CacheClient>> {
        self.client.as_ref()
    }

    /// The current generation of `resource`'s namespace.
    pub async fn generation(&self, resource: &str) -> u64 {
        self.generations
            .read()
            .await
            .get(resource)
            .copied()
            .unwrap_or(0)
    }

    /// Stores a read result unless the namespace was evicted since
    /// `generation` was taken. Returns whether the entry was written.
    pub async fn fill(
        &self,
        resource: &str,
        generation: u64,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        let Some(client) = &self.client else {
            return Ok(false);
        };
        let generations = self.generations.read().await;
        if generations.get(resource).copied().unwrap_or(0) != generation {
            debug!(resource, key, "namespace evicted during read, fill skipped");
            return Ok(false);
        }
        client.set(key, value, ttl).await?;
        Ok(true)
    }

    /// Evicts every entry under `<resource>.*` and returns the count evicted.
    pub async fn break_cache(&self, resource: &str) -> CacheResult<usize> {
        let Some(client) = &self.client else {
            return Ok(0);
        };
        let mut generations = self.generations.write().await;
        *generations.entry(resource.to_string()).or_insert(0) += 1;
        let evicted = client.clean(&namespace_pattern(resource)).await?;
        debug!(resource, evicted, "cache namespace evicted");
        Ok(evicted)
    }
}
