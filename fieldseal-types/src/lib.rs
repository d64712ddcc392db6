//! Core type definitions for fieldseal.
//!
//! This crate defines the plugin-agnostic types every other fieldseal crate
//! speaks:
//! - [`Record`], the schemaless field-name → value mapping of one stored row
//! - [`Operation`], the closed set of CRUD-style operations a resource exposes
//! - [`OperationParams`], the parameters an operation is invoked with
//! - [`ResourceEvent`], notifications published after mutations
//!
//! Nothing here knows about encryption, caching or storage.

mod event;
mod operation;
mod params;
mod record;

pub use event::{EventKind, ResourceEvent};
pub use operation::Operation;
pub use params::{DataPayload, OperationParams};
pub use record::{new_record_id, Record, RecordExt};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid parameters for {operation}: {reason}")]
    InvalidParams { operation: Operation, reason: String },
}
