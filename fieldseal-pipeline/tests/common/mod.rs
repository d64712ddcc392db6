#![allow(dead_code)]

use fieldseal_cache::MemoryCache;
use fieldseal_crypto::{FieldCrypto, HashParams};
use fieldseal_model::ResourceConfig;
use fieldseal_pipeline::{BroadcastEmitter, PipelineHost, Services};
use fieldseal_storage::MemoryStore;
use fieldseal_types::{OperationParams, Record};
use serde_json::Value;
use std::sync::Arc;

pub const PASSPHRASE: &str = "correct horse battery staple";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Cheap Argon2 cost so hashing tests stay fast.
pub fn fast_hash() -> HashParams {
    HashParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

pub fn crypto() -> FieldCrypto {
    FieldCrypto::with_passphrase(PASSPHRASE)
        .unwrap()
        .with_hash_params(fast_hash())
}

pub fn obj(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

pub fn params(value: Value) -> OperationParams {
    OperationParams::from_value(value).unwrap()
}

/// `order` with one field of each class, cascading to `lineItem`.
pub fn order_resource() -> ResourceConfig {
    ResourceConfig::new("order")
        .encrypted(["encryptedText"])
        .deterministic(["deterministicEncryptedText"])
        .hashed(["hashedText"])
        .cascade("lineItem")
}

/// `lineItem` with an encrypted note, cascading to `lineItemNote`.
pub fn line_item_resource() -> ResourceConfig {
    ResourceConfig::new("lineItem")
        .encrypted(["note"])
        .cascade("lineItemNote")
}

pub fn line_item_note_resource() -> ResourceConfig {
    ResourceConfig::new("lineItemNote").deterministic(["body"])
}

pub struct Harness {
    pub host: PipelineHost,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub events: BroadcastEmitter,
}

impl Harness {
    /// Rows of `resource` as the store holds them, bypassing the pipeline.
    pub async fn raw(&self, resource: &str) -> Vec<Record> {
        self.store.snapshot(resource).await
    }
}

pub fn harness_with(resources: Vec<ResourceConfig>) -> Harness {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let events = BroadcastEmitter::new(64);
    let services = Services::new(store.clone(), Arc::new(crypto()))
        .with_cache(cache.clone(), None)
        .with_emitter(Arc::new(events.clone()));

    let mut host = PipelineHost::new(services);
    for resource in resources {
        host.register(resource).unwrap();
    }
    host.check_relations().unwrap();
    Harness {
        host,
        store,
        cache,
        events,
    }
}

/// `order`, `lineItem` and `lineItemNote`.
pub fn harness() -> Harness {
    harness_with(vec![
        order_resource(),
        line_item_resource(),
        line_item_note_resource(),
    ])
}

pub fn is_envelope(value: &Value, parts: usize) -> bool {
    value.as_str().is_some_and(|s| {
        let pieces: Vec<&str> = s.split(':').collect();
        pieces.len() == parts
            && pieces
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_hexdigit()))
    })
}
