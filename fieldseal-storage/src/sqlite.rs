//! SQLite-backed record store.
//!
//! Rows are kept as JSON documents in one table keyed by `(resource, id)`.
//! Operations load the resource's rows in insertion order, evaluate, and
//! write the resulting changes in a single transaction.

use crate::error::{StorageError, StorageResult};
use crate::query::{self, Change};
use crate::store::RecordStore;
use async_trait::async_trait;
use fieldseal_types::{Operation, OperationParams, Record, RecordExt};
use rusqlite::{params, Connection, Transaction};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        resource TEXT NOT NULL,
        id TEXT NOT NULL,
        data TEXT NOT NULL,
        PRIMARY KEY (resource, id)
    );
";

/// Persistent store backed by a SQLite file.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening sqlite record store");
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Number of rows stored for `resource`.
    pub fn len(&self, resource: &str) -> StorageResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE resource = ?1",
            params![resource],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn load(conn: &Connection, resource: &str) -> StorageResult<Vec<Record>> {
    let mut stmt = conn.prepare("SELECT data FROM records WHERE resource = ?1 ORDER BY rowid")?;
    let docs = stmt
        .query_map(params![resource], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    docs.iter()
        .map(|doc| serde_json::from_str(doc).map_err(StorageError::from))
        .collect()
}

fn id_of(record: &Record) -> StorageResult<&str> {
    record
        .id()
        .ok_or_else(|| StorageError::InvalidQuery("record has no id".into()))
}

fn persist(tx: &Transaction<'_>, resource: &str, changes: &[Change]) -> StorageResult<()> {
    for change in changes {
        match change {
            Change::Insert(record) => {
                tx.execute(
                    "INSERT INTO records (resource, id, data) VALUES (?1, ?2, ?3)",
                    params![resource, id_of(record)?, serde_json::to_string(record)?],
                )?;
            }
            Change::Update(record) => {
                tx.execute(
                    "UPDATE records SET data = ?3 WHERE resource = ?1 AND id = ?2",
                    params![resource, id_of(record)?, serde_json::to_string(record)?],
                )?;
            }
            Change::Delete(id) => {
                tx.execute(
                    "DELETE FROM records WHERE resource = ?1 AND id = ?2",
                    params![resource, id],
                )?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn execute(
        &self,
        resource: &str,
        operation: Operation,
        params: &OperationParams,
    ) -> StorageResult<Value> {
        let mut conn = self.lock()?;
        if !operation.is_mutation() {
            let rows = load(&conn, resource)?;
            return Ok(query::evaluate(&rows, operation, params)?.value);
        }

        let tx = conn.transaction()?;
        let rows = load(&tx, resource)?;
        let outcome = query::evaluate(&rows, operation, params)?;
        persist(&tx, resource, &outcome.changes)?;
        tx.commit()?;
        trace!(resource, %operation, changes = outcome.changes.len(), "sqlite store write");
        Ok(outcome.value)
    }
}
