//! Operation parameters.
//!
//! A single struct carries every parameter any operation accepts; which ones
//! are required is decided per operation by [`OperationParams::validate`].

use crate::{Error, Operation, Record, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `data` payload of a write: one record, or many for `createMany`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataPayload {
    Many(Vec<Record>),
    One(Record),
}

impl DataPayload {
    /// Mutable access to every record in the payload.
    pub fn records_mut(&mut self) -> Vec<&mut Record> {
        match self {
            DataPayload::Many(records) => records.iter_mut().collect(),
            DataPayload::One(record) => vec![record],
        }
    }

    pub fn as_one(&self) -> Option<&Record> {
        match self {
            DataPayload::One(record) => Some(record),
            DataPayload::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Record]> {
        match self {
            DataPayload::Many(records) => Some(records),
            DataPayload::One(_) => None,
        }
    }
}

/// Parameters of one operation invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationParams {
    /// The `where` clause.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit: Option<Record>,
    /// `{ field: "asc" | "desc" }` or an array of such objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
    /// Id of the record a page starts at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Grouping fields for `groupBy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_duplicates: Option<bool>,
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
    #[serde(rename = "_min", default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Record>,
    #[serde(rename = "_max", default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Record>,
    #[serde(rename = "_sum", default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<Record>,
    #[serde(rename = "_avg", default, skip_serializing_if = "Option::is_none")]
    pub avg: Option<Record>,
}

impl OperationParams {
    /// Parses parameters from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes back to a JSON object.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parameters carrying only a `where` clause.
    pub fn with_where(filter: Record) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Parameters carrying only a single-record `data` payload.
    pub fn with_data(data: Record) -> Self {
        Self {
            data: Some(DataPayload::One(data)),
            ..Self::default()
        }
    }

    /// `where: { <field>: <value> }`.
    pub fn where_eq(field: &str, value: impl Into<Value>) -> Self {
        let mut filter = Record::new();
        filter.insert(field.to_string(), value.into());
        Self::with_where(filter)
    }

    /// Checks that the parameters the operation requires are present and
    /// well-shaped.
    pub fn validate(&self, operation: Operation) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidParams {
            operation,
            reason: reason.to_string(),
        };

        let needs_where = matches!(
            operation,
            Operation::FindUnique
                | Operation::FindUniqueOrThrow
                | Operation::FindFirst
                | Operation::FindFirstOrThrow
                | Operation::Update
                | Operation::UpdateMany
                | Operation::Delete
                | Operation::DeleteMany
        );
        if needs_where && self.filter.is_none() {
            return Err(invalid("`where` is required"));
        }
        if matches!(operation, Operation::FindUnique | Operation::FindUniqueOrThrow)
            && self.filter.as_ref().is_some_and(Record::is_empty)
        {
            return Err(invalid("`where` must name at least one field"));
        }

        match operation {
            Operation::Create | Operation::Update | Operation::UpdateMany => {
                match &self.data {
                    Some(DataPayload::One(_)) => {}
                    Some(DataPayload::Many(_)) => {
                        return Err(invalid("`data` must be a single object"));
                    }
                    None => return Err(invalid("`data` is required")),
                }
            }
            Operation::CreateMany => match &self.data {
                Some(DataPayload::Many(_)) => {}
                Some(DataPayload::One(_)) => {
                    return Err(invalid("`data` must be an array of objects"));
                }
                None => return Err(invalid("`data` is required")),
            },
            Operation::GroupBy => {
                if self.by.as_ref().is_none_or(Vec::is_empty) {
                    return Err(invalid("`by` must name at least one field"));
                }
            }
            _ => {}
        }

        Ok(())
    }
}
