//! The record shape every layer passes around.

use serde_json::{Map, Value};
use uuid::Uuid;

/// One persisted entity: field name → JSON value.
///
/// Iteration order is the map's key order, so the same record always walks
/// its fields the same way.
pub type Record = Map<String, Value>;

/// Read helpers shared by every layer that inspects records.
pub trait RecordExt {
    /// The record's `id`, when present as a string.
    fn id(&self) -> Option<&str>;

    /// A string field, if present and a string.
    fn get_str(&self, field: &str) -> Option<&str>;
}

impl RecordExt for Record {
    fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }
}

/// Generates a fresh record id (UUID v7, time ordered).
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}
