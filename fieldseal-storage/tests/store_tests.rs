use fieldseal_storage::{MemoryStore, RecordStore, SqliteStore};
use fieldseal_types::{Operation, OperationParams};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn params(value: Value) -> OperationParams {
    OperationParams::from_value(value).unwrap()
}

/// Runs the same lifecycle against any store.
async fn exercise(store: &dyn RecordStore) {
    let created = store
        .execute("order", Operation::Create, &params(json!({ "data": { "id": "o1", "total": 10 } })))
        .await
        .unwrap();
    assert_eq!(created, json!({ "id": "o1", "total": 10 }));

    store
        .execute(
            "order",
            Operation::CreateMany,
            &params(json!({ "data": [{ "id": "o2", "total": 20 }, { "id": "o3", "total": 30 }] })),
        )
        .await
        .unwrap();
    store
        .execute("lineItem", Operation::Create, &params(json!({ "data": { "id": "l1", "orderId": "o1" } })))
        .await
        .unwrap();

    let all = store
        .execute("order", Operation::FindMany, &OperationParams::default())
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let updated = store
        .execute(
            "order",
            Operation::Update,
            &params(json!({ "where": { "id": "o2" }, "data": { "total": 25 } })),
        )
        .await
        .unwrap();
    assert_eq!(updated["total"], 25);

    let found = store
        .execute("order", Operation::FindUnique, &OperationParams::where_eq("id", "o2"))
        .await
        .unwrap();
    assert_eq!(found["total"], 25);

    let deleted = store
        .execute("order", Operation::DeleteMany, &params(json!({ "where": { "total": { "gte": 25 } } })))
        .await
        .unwrap();
    assert_eq!(deleted, json!({ "count": 2 }));

    let remaining = store
        .execute("order", Operation::Count, &OperationParams::default())
        .await
        .unwrap();
    assert_eq!(remaining, json!(1));

    // Resources are isolated from each other.
    let items = store
        .execute("lineItem", Operation::Count, &OperationParams::default())
        .await
        .unwrap();
    assert_eq!(items, json!(1));

    let err = store
        .execute("order", Operation::Delete, &OperationParams::where_eq("id", "o3"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ── Memory ───────────────────────────────────────────────────────

#[tokio::test]
async fn memory_store_lifecycle() {
    let store = MemoryStore::new();
    exercise(&store).await;
    assert_eq!(store.len("order").await, 1);
    assert_eq!(store.backend_name(), "memory");
}

#[tokio::test]
async fn memory_store_reads_unknown_resource_as_empty() {
    let store = MemoryStore::new();
    let out = store
        .execute("ghost", Operation::FindMany, &OperationParams::default())
        .await
        .unwrap();
    assert_eq!(out, json!([]));
}

#[tokio::test]
async fn memory_store_failed_write_changes_nothing() {
    let store = MemoryStore::new();
    store
        .execute("order", Operation::Create, &params(json!({ "data": { "id": "o1" } })))
        .await
        .unwrap();
    let err = store
        .execute(
            "order",
            Operation::CreateMany,
            &params(json!({ "data": [{ "id": "o2" }, { "id": "o1" }] })),
        )
        .await;
    assert!(err.is_err());
    assert_eq!(store.len("order").await, 1);
}

// ── SQLite ───────────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_store_lifecycle() {
    let store = SqliteStore::open_in_memory().unwrap();
    exercise(&store).await;
    assert_eq!(store.len("order").unwrap(), 1);
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .execute("order", Operation::Create, &params(json!({ "data": { "id": "o1", "note": "kept" } })))
            .await
            .unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let found = reopened
        .execute("order", Operation::FindUnique, &OperationParams::where_eq("id", "o1"))
        .await
        .unwrap();
    assert_eq!(found, json!({ "id": "o1", "note": "kept" }));
}

#[tokio::test]
async fn sqlite_store_keeps_insertion_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    for id in ["c", "a", "b"] {
        store
            .execute("order", Operation::Create, &params(json!({ "data": { "id": id } })))
            .await
            .unwrap();
    }
    let all = store
        .execute("order", Operation::FindMany, &OperationParams::default())
        .await
        .unwrap();
    assert_eq!(all, json!([{ "id": "c" }, { "id": "a" }, { "id": "b" }]));
}
