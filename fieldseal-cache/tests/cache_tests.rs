use fieldseal_cache::{cache_key, CacheClient, CacheInvalidator, MemoryCache};
use fieldseal_types::{Operation, OperationParams};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// ── MemoryCache ──────────────────────────────────────────────────

#[tokio::test]
async fn set_then_get() {
    let cache = MemoryCache::new();
    cache.set("order.findMany:1", json!([1, 2]), None).await.unwrap();
    assert_eq!(cache.get("order.findMany:1").await.unwrap(), Some(json!([1, 2])));
    assert_eq!(cache.get("order.findMany:2").await.unwrap(), None);
}

#[tokio::test]
async fn expired_entries_are_misses() {
    let cache = MemoryCache::new();
    cache
        .set("order.findFirst:x", json!({ "id": "o1" }), Some(Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(cache.get("order.findFirst:x").await.unwrap(), None);
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn clean_evicts_only_matching_keys() {
    let cache = MemoryCache::new();
    for key in ["order.findMany:a", "order.findFirst:b", "orderLine.findMany:c", "user.findMany:d"] {
        cache.set(key, json!(null), None).await.unwrap();
    }
    let evicted = cache.clean("order.*").await.unwrap();
    assert_eq!(evicted, 2);
    assert_eq!(
        cache.keys().await,
        vec!["orderLine.findMany:c".to_string(), "user.findMany:d".to_string()]
    );
}

// ── CacheInvalidator ─────────────────────────────────────────────

#[tokio::test]
async fn break_cache_clears_resource_namespace() {
    let cache = Arc::new(MemoryCache::new());
    cache.set("order.findMany:a", json!([]), None).await.unwrap();
    cache.set("user.findMany:a", json!([]), None).await.unwrap();

    let invalidator = CacheInvalidator::new(cache.clone());
    assert!(invalidator.is_enabled());
    assert_eq!(invalidator.break_cache("order").await.unwrap(), 1);
    assert_eq!(cache.keys().await, vec!["user.findMany:a".to_string()]);
}

#[tokio::test]
async fn disabled_invalidator_is_noop() {
    let invalidator = CacheInvalidator::disabled();
    assert!(!invalidator.is_enabled());
    assert_eq!(invalidator.break_cache("order").await.unwrap(), 0);
}

#[tokio::test]
async fn fill_writes_when_namespace_untouched() {
    let cache = Arc::new(MemoryCache::new());
    let invalidator = CacheInvalidator::new(cache.clone());

    let generation = invalidator.generation("order").await;
    let written = invalidator
        .fill("order", generation, "order.findMany:a", json!([1]), None)
        .await
        .unwrap();
    assert!(written);
    assert_eq!(cache.get("order.findMany:a").await.unwrap(), Some(json!([1])));
}

#[tokio::test]
async fn fill_after_eviction_is_dropped() {
    let cache = Arc::new(MemoryCache::new());
    let invalidator = CacheInvalidator::new(cache.clone());

    let generation = invalidator.generation("order").await;
    invalidator.break_cache("order").await.unwrap();
    assert_eq!(invalidator.generation("order").await, generation + 1);

    let written = invalidator
        .fill("order", generation, "order.findMany:a", json!(["stale"]), None)
        .await
        .unwrap();
    assert!(!written);
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn eviction_of_other_namespace_keeps_fill() {
    let cache = Arc::new(MemoryCache::new());
    let invalidator = CacheInvalidator::new(cache.clone());

    let generation = invalidator.generation("order").await;
    invalidator.clone().break_cache("user").await.unwrap();
    assert!(invalidator
        .fill("order", generation, "order.findMany:a", json!([]), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn disabled_invalidator_never_fills() {
    let invalidator = CacheInvalidator::disabled();
    assert!(invalidator.client().is_none());
    assert!(!invalidator
        .fill("order", 0, "order.findMany:a", json!([]), None)
        .await
        .unwrap());
}

// ── Keys ─────────────────────────────────────────────────────────

#[test]
fn cache_key_is_namespaced_and_stable() {
    let params = OperationParams::where_eq("id", "o1");
    let a = cache_key("order", Operation::FindUnique, &params).unwrap();
    let b = cache_key("order", Operation::FindUnique, &params.clone()).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with("order.findUnique:"));
    assert_eq!(a.len(), "order.findUnique:".len() + 64);
}

#[test]
fn cache_key_differs_by_params_and_operation() {
    let p1 = OperationParams::where_eq("id", "o1");
    let p2 = OperationParams::where_eq("id", "o2");
    let k1 = cache_key("order", Operation::FindFirst, &p1).unwrap();
    assert_ne!(k1, cache_key("order", Operation::FindFirst, &p2).unwrap());
    assert_ne!(k1, cache_key("order", Operation::FindMany, &p1).unwrap());
}
