mod common;

use async_trait::async_trait;
use common::{crypto, harness, init_tracing, is_envelope, params};
use fieldseal_model::{ForeignKeyConstraint, ResourceConfig};
use fieldseal_pipeline::{
    CascadeCoordinator, PipelineError, PipelineHost, PipelineResult,
    ResourceInvoker, Services,
};
use fieldseal_storage::{MemoryStore, RecordStore, StorageError, StorageResult};
use fieldseal_types::{Operation, OperationParams};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Wraps a store, logging every call and failing `deleteMany` on one
/// resource.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    log: Mutex<Vec<(String, Operation)>>,
    failing: Option<String>,
}

impl RecordingStore {
    fn failing_on(resource: &str) -> Self {
        Self {
            failing: Some(resource.to_string()),
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<(String, Operation)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, op)| op.is_mutation())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn execute(
        &self,
        resource: &str,
        operation: Operation,
        params: &OperationParams,
    ) -> StorageResult<Value> {
        self.log.lock().unwrap().push((resource.to_string(), operation));
        if operation == Operation::DeleteMany && self.failing.as_deref() == Some(resource) {
            return Err(StorageError::InvalidQuery("store unavailable".into()));
        }
        self.inner.execute(resource, operation, params).await
    }
}

fn host_over(store: Arc<RecordingStore>, resources: Vec<ResourceConfig>) -> PipelineHost {
    init_tracing();
    let mut host = PipelineHost::new(Services::new(store, Arc::new(crypto())));
    for resource in resources {
        host.register(resource).unwrap();
    }
    host
}

async fn seed(host: &PipelineHost, resource: &str, data: Value) {
    host.call(resource, Operation::Create, params(json!({ "data": data })))
        .await
        .unwrap();
}

// ── Through the host ─────────────────────────────────────────────

#[tokio::test]
async fn deleting_order_removes_its_line_items_first() {
    let store = Arc::new(RecordingStore::default());
    let host = host_over(
        store.clone(),
        vec![
            ResourceConfig::new("order").cascade("lineItem"),
            ResourceConfig::new("lineItem"),
        ],
    );
    seed(&host, "order", json!({ "id": "o1" })).await;
    seed(&host, "lineItem", json!({ "id": "l1", "orderId": "o1" })).await;

    host.call("order", Operation::Delete, OperationParams::where_eq("id", "o1"))
        .await
        .unwrap();

    let writes = store.writes();
    let child = writes
        .iter()
        .position(|w| *w == ("lineItem".to_string(), Operation::DeleteMany))
        .unwrap();
    let parent = writes
        .iter()
        .position(|w| *w == ("order".to_string(), Operation::Delete))
        .unwrap();
    assert!(child < parent, "{writes:?}");
}

#[tokio::test]
async fn cascades_recurse_and_spare_unrelated_rows() {
    let h = harness();
    seed(&h.host, "order", json!({ "id": "o1" })).await;
    seed(&h.host, "order", json!({ "id": "o2" })).await;
    seed(&h.host, "lineItem", json!({ "id": "l1", "orderId": "o1", "note": "fragile" })).await;
    seed(&h.host, "lineItem", json!({ "id": "l2", "orderId": "o1" })).await;
    seed(&h.host, "lineItem", json!({ "id": "l3", "orderId": "o2" })).await;
    seed(&h.host, "lineItemNote", json!({ "id": "n1", "lineItemId": "l1", "body": "b" })).await;
    seed(&h.host, "lineItemNote", json!({ "id": "n2", "lineItemId": "l3", "body": "b" })).await;

    h.host
        .call("order", Operation::Delete, OperationParams::where_eq("id", "o1"))
        .await
        .unwrap();

    let ids = |rows: Vec<fieldseal_types::Record>| -> Vec<String> {
        rows.iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(ids(h.raw("order").await), vec!["o2"]);
    assert_eq!(ids(h.raw("lineItem").await), vec!["l3"]);
    assert_eq!(ids(h.raw("lineItemNote").await), vec!["n2"]);
}

#[tokio::test]
async fn delete_many_cascades_for_every_match() {
    let h = harness();
    for id in ["o1", "o2", "o3"] {
        let status = if id == "o3" { "open" } else { "closed" };
        seed(&h.host, "order", json!({ "id": id, "status": status })).await;
        seed(&h.host, "lineItem", json!({ "orderId": id })).await;
    }

    let out = h
        .host
        .call("order", Operation::DeleteMany, params(json!({ "where": { "status": "closed" } })))
        .await
        .unwrap();
    assert_eq!(out, json!({ "count": 2 }));

    let items = h.raw("lineItem").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["orderId"], "o3");
}

#[tokio::test]
async fn deleted_events_follow_cascade_order_and_carry_stored_records() {
    let h = harness();
    let mut events = h.events.subscribe();
    seed(&h.host, "order", json!({ "id": "o1" })).await;
    seed(&h.host, "lineItem", json!({ "id": "l1", "orderId": "o1", "note": "fragile" })).await;
    seed(&h.host, "lineItemNote", json!({ "id": "n1", "lineItemId": "l1", "body": "b" })).await;

    h.host
        .call("order", Operation::Delete, OperationParams::where_eq("id", "o1"))
        .await
        .unwrap();

    let mut names = Vec::new();
    let mut item_event = None;
    while let Ok(event) = events.try_recv() {
        names.push(event.name.clone());
        if event.resource == "lineItem" {
            item_event = Some(event);
        }
    }
    assert_eq!(names, vec!["lineItemNote.deleted", "lineItem.deleted", "order.deleted"]);

    let records = item_event.unwrap().records();
    assert_eq!(records.len(), 1);
    assert!(is_envelope(&records[0]["note"], 3));
}

#[tokio::test]
async fn no_event_when_nothing_matched() {
    let h = harness();
    let mut events = h.events.subscribe();

    let out = h
        .host
        .call("order", Operation::DeleteMany, params(json!({ "where": { "status": "none" } })))
        .await
        .unwrap();
    assert_eq!(out, json!({ "count": 0 }));

    let err = h
        .host
        .call("order", Operation::Delete, OperationParams::where_eq("id", "ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn failed_cascade_keeps_parent_and_earlier_deletions() {
    let store = Arc::new(RecordingStore::failing_on("shipment"));
    let host = host_over(
        store.clone(),
        vec![
            ResourceConfig::new("order").cascade("lineItem").cascade("shipment"),
            ResourceConfig::new("lineItem"),
            ResourceConfig::new("shipment"),
        ],
    );
    seed(&host, "order", json!({ "id": "o1" })).await;
    seed(&host, "lineItem", json!({ "id": "l1", "orderId": "o1" })).await;

    let err = host
        .call("order", Operation::Delete, OperationParams::where_eq("id", "o1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INTERNAL_ERROR");

    assert_eq!(store.inner.len("lineItem").await, 0);
    assert_eq!(store.inner.len("order").await, 1);
}

#[tokio::test]
async fn explicit_foreign_key_field_is_used() {
    let store = Arc::new(RecordingStore::default());
    let host = host_over(
        store.clone(),
        vec![
            ResourceConfig::new("customer").cascade_on("invoice", "billedTo"),
            ResourceConfig::new("invoice"),
        ],
    );
    seed(&host, "customer", json!({ "id": "c1" })).await;
    seed(&host, "invoice", json!({ "id": "i1", "billedTo": "c1" })).await;
    seed(&host, "invoice", json!({ "id": "i2", "customerId": "c1" })).await;

    host.call("customer", Operation::Delete, OperationParams::where_eq("id", "c1"))
        .await
        .unwrap();
    let left = store.inner.snapshot("invoice").await;
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["id"], "i2");
}

// ── Coordinator alone ────────────────────────────────────────────

#[derive(Default)]
struct LoggingInvoker {
    calls: Mutex<Vec<(String, Operation, Value)>>,
}

#[async_trait]
impl ResourceInvoker for LoggingInvoker {
    async fn call(
        &self,
        resource: &str,
        operation: Operation,
        params: OperationParams,
    ) -> PipelineResult<Value> {
        let filter = Value::Object(params.filter.unwrap_or_default());
        self.calls
            .lock()
            .unwrap()
            .push((resource.to_string(), operation, filter));
        if resource == "broken" {
            return Err(PipelineError::Configuration("unknown resource 'broken'".into()));
        }
        Ok(json!({ "count": 0 }))
    }
}

#[tokio::test]
async fn coordinator_issues_delete_many_per_relation_and_id() {
    let constraints = vec![
        ForeignKeyConstraint::new("lineItem"),
        ForeignKeyConstraint::with_field("payment", "purchaseId"),
    ];
    let coordinator = CascadeCoordinator::new("order", &constraints);
    let invoker = LoggingInvoker::default();

    coordinator
        .cascade_delete_many(&invoker, &["o1".to_string(), "o2".to_string()])
        .await
        .unwrap();

    let calls = invoker.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("lineItem".to_string(), Operation::DeleteMany, json!({ "orderId": "o1" })),
            ("payment".to_string(), Operation::DeleteMany, json!({ "purchaseId": "o1" })),
            ("lineItem".to_string(), Operation::DeleteMany, json!({ "orderId": "o2" })),
            ("payment".to_string(), Operation::DeleteMany, json!({ "purchaseId": "o2" })),
        ]
    );
}

#[tokio::test]
async fn coordinator_stops_at_first_failure() {
    let constraints = vec![
        ForeignKeyConstraint::new("broken"),
        ForeignKeyConstraint::new("lineItem"),
    ];
    let coordinator = CascadeCoordinator::new("order", &constraints);
    let invoker = LoggingInvoker::default();

    let err = coordinator.cascade_delete(&invoker, "o1").await.unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
    assert_eq!(invoker.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn coordinator_without_relations_calls_nothing() {
    let coordinator = CascadeCoordinator::new("order", &[]);
    let invoker = LoggingInvoker::default();
    coordinator
        .cascade_delete_many(&invoker, &["o1".to_string()])
        .await
        .unwrap();
    assert!(invoker.calls.lock().unwrap().is_empty());
}
