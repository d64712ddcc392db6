//! Caching for fieldseal.
//!
//! - [`CacheClient`]: the backend boundary (get, set with TTL, pattern clean)
//! - [`MemoryCache`]: an in-process backend
//! - [`CacheInvalidator`]: evicts a resource's whole `<resource>.*` namespace
//! - [`cache_key`]: stable keys for read results
//!
//! Cached values are whatever the store returned, so classified fields stay
//! encrypted while cached.

mod client;
mod error;
mod invalidator;
mod key;
mod memory;
mod pattern;

pub use client::CacheClient;
pub use error::{CacheError, CacheResult};
pub use invalidator::CacheInvalidator;
pub use key::{cache_key, namespace_pattern};
pub use memory::MemoryCache;
pub use pattern::glob_matches;
