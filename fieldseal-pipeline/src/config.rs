//! Host configuration: key, hash cost, cache settings and resources.
//!
//! Loaded from JSON, then overridden from the environment:
//! - `FIELDSEAL_ENCRYPTION_KEY` supplies the passphrase out-of-band
//! - `FIELDSEAL_CACHE_TTL_SECS` replaces the default cache TTL

use crate::error::{PipelineError, PipelineResult};
use fieldseal_crypto::{FieldCrypto, HashParams};
use fieldseal_model::ResourceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const ENV_ENCRYPTION_KEY: &str = "FIELDSEAL_ENCRYPTION_KEY";
pub const ENV_CACHE_TTL_SECS: &str = "FIELDSEAL_CACHE_TTL_SECS";

/// Argon2 cost parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_cost() -> u32 {
    HashParams::default().memory_cost
}

fn default_time_cost() -> u32 {
    HashParams::default().time_cost
}

fn default_parallelism() -> u32 {
    HashParams::default().parallelism
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_memory_cost(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
        }
    }
}

impl From<&HashConfig> for HashParams {
    fn from(config: &HashConfig) -> Self {
        HashParams {
            memory_cost: config.memory_cost,
            time_cost: config.time_cost,
            parallelism: config.parallelism,
        }
    }
}

/// Read-through cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// TTL for resources without their own; `None` keeps entries until
    /// evicted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ttl_secs: Option<u64>,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            default_ttl_secs: None,
        }
    }
}

/// Everything a [`crate::PipelineHost`] is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Passphrase the encryption key is derived from. Never serialized.
    #[serde(default, skip_serializing)]
    pub encryption_key: Option<String>,
    #[serde(default)]
    pub hash: HashConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> PipelineResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| PipelineError::Configuration(format!("invalid pipeline config: {e}")))
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), resources = config.resources.len(), "pipeline config loaded");
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> PipelineResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        if let Some(key) = lookup(ENV_ENCRYPTION_KEY).filter(|k| !k.is_empty()) {
            self.encryption_key = Some(key);
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                PipelineError::Configuration(format!(
                    "{ENV_CACHE_TTL_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            self.cache.default_ttl_secs = Some(secs);
        }
        Ok(self)
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.cache.default_ttl_secs.map(Duration::from_secs)
    }

    /// Builds the crypto engine; without a passphrase only hashing works.
    pub fn crypto(&self) -> PipelineResult<FieldCrypto> {
        let crypto = match self.encryption_key.as_deref() {
            Some(passphrase) => FieldCrypto::with_passphrase(passphrase)
                .map_err(|e| PipelineError::Configuration(e.to_string()))?,
            None => FieldCrypto::without_key(),
        };
        Ok(crypto.with_hash_params(HashParams::from(&self.hash)))
    }
}
