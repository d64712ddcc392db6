//! Notifications published to the hosting runtime after mutations.

use crate::Record;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// What happened to the records carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Deleted,
}

impl EventKind {
    pub const fn suffix(&self) -> &'static str {
        match self {
            EventKind::Deleted => "deleted",
        }
    }
}

/// An event on a resource's notification channel, e.g. `order.deleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvent {
    /// Channel name, `<resource>.<kind>`.
    pub name: String,
    pub resource: String,
    pub kind: EventKind,
    pub payload: Value,
}

impl ResourceEvent {
    /// A `<resource>.deleted` event with payload `{ "records": [...] }`.
    pub fn deleted(resource: &str, records: Vec<Record>) -> Self {
        Self {
            name: format!("{resource}.{}", EventKind::Deleted.suffix()),
            resource: resource.to_string(),
            kind: EventKind::Deleted,
            payload: json!({ "records": records }),
        }
    }

    /// The records carried in the payload, if any.
    pub fn records(&self) -> Vec<Record> {
        self.payload
            .get("records")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
