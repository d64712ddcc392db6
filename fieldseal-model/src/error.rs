//! Error types for resource configuration.

use crate::FieldClass;
use thiserror::Error;

/// Result type for configuration checks.
pub type ModelResult<T> = Result<T, ModelError>;

/// A resource configuration that cannot be put into service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("resource name is empty")]
    EmptyResourceName,

    #[error("invalid field '{field}' on resource '{resource}': {reason}")]
    InvalidField {
        resource: String,
        field: String,
        reason: String,
    },

    #[error("field '{field}' on resource '{resource}' is listed in both {first} and {second}")]
    OverlappingField {
        resource: String,
        field: String,
        first: FieldClass,
        second: FieldClass,
    },

    #[error("invalid foreign-key constraint on resource '{resource}': {reason}")]
    InvalidConstraint { resource: String, reason: String },

    #[error("resource '{0}' is already registered")]
    DuplicateResource(String),
}
