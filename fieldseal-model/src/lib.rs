//! Resource configuration for fieldseal.
//!
//! Defines what a resource declares to the data-access pipeline:
//! - [`ResourceConfig`]: field classifications, cascade relations, cache TTL
//! - [`FieldClass`]: random encryption, deterministic encryption or hashing
//! - [`ForeignKeyConstraint`]: a dependent resource deleted before its parent
//!
//! Configurations are plain data, validated once at startup and immutable
//! afterwards.

mod error;
mod resource;

pub use error::{ModelError, ModelResult};
pub use resource::{default_foreign_key, FieldClass, ForeignKeyConstraint, ResourceConfig};
