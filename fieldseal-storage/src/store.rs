//! The record store boundary.

use crate::error::StorageResult;
use async_trait::async_trait;
use fieldseal_types::{Operation, OperationParams};
use serde_json::Value;

/// The data-access backend behind every resource.
///
/// A store receives operations with classified fields already transformed,
/// so it only ever sees envelopes and hashes. It owns no encryption, caching
/// or cascade logic.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Executes `operation` on `resource` and returns its raw result.
    ///
    /// Single-record reads yield an object or `null`, `findMany` and `groupBy`
    /// an array, `count` a number, and bulk writes `{ "count": n }`.
    async fn execute(
        &self,
        resource: &str,
        operation: Operation,
        params: &OperationParams,
    ) -> StorageResult<Value>;
}
