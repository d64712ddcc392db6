//! In-process record store.

use crate::error::StorageResult;
use crate::query::{self, Change};
use crate::store::RecordStore;
use async_trait::async_trait;
use fieldseal_types::{Operation, OperationParams, Record, RecordExt};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

/// Keeps every resource's rows in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held for `resource`.
    pub async fn len(&self, resource: &str) -> usize {
        self.tables.read().await.get(resource).map_or(0, Vec::len)
    }

    /// A copy of every row held for `resource`, as stored.
    pub async fn snapshot(&self, resource: &str) -> Vec<Record> {
        self.tables
            .read()
            .await
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }
}

fn apply(rows: &mut Vec<Record>, changes: Vec<Change>) {
    for change in changes {
        match change {
            Change::Insert(record) => rows.push(record),
            Change::Update(record) => {
                if let Some(slot) = rows.iter_mut().find(|r| r.id() == record.id()) {
                    *slot = record;
                }
            }
            Change::Delete(id) => rows.retain(|r| r.id() != Some(id.as_str())),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn execute(
        &self,
        resource: &str,
        operation: Operation,
        params: &OperationParams,
    ) -> StorageResult<Value> {
        if !operation.is_mutation() {
            let tables = self.tables.read().await;
            let rows = tables.get(resource).map(Vec::as_slice).unwrap_or_default();
            return Ok(query::evaluate(rows, operation, params)?.value);
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(resource.to_string()).or_default();
        let outcome = query::evaluate(rows, operation, params)?;
        trace!(resource, %operation, changes = outcome.changes.len(), "memory store write");
        apply(rows, outcome.changes);
        Ok(outcome.value)
    }
}
