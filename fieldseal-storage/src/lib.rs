//! Record storage for fieldseal.
//!
//! Defines the [`RecordStore`] boundary the pipeline executes operations
//! against, plus two reference stores sharing one evaluator:
//!
//! - [`MemoryStore`]: rows held in process, for tests and ephemeral hosts
//! - [`SqliteStore`]: rows persisted as JSON documents in SQLite
//!
//! # Architecture
//!
//! - [`filter`] evaluates `where` clauses
//! - [`query`] turns an operation into a result plus row [`Change`]s
//! - stores only load rows and persist changes

mod error;
pub mod filter;
mod memory;
pub mod query;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use query::{evaluate, Change, Outcome};
pub use sqlite::SqliteStore;
pub use store::RecordStore;
