//! The aggregation store: an upsert-only schema with a compound
//! uniqueness key, WAL-mode durability, and transactional batch writes.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::model::{KeystrokeEvent, KeystrokeRow};
use crate::paths::{ensure_parents, PathError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to open store at {path}: {source}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("failed to begin transaction: {0}")]
    BeginTransaction(#[source] rusqlite::Error),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] rusqlite::Error),

    #[error("failed to prepare upsert statement: {0}")]
    Prepare(#[source] rusqlite::Error),

    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),
}

const SCHEMA: &str = "
create table if not exists keystrokes (
    id         integer primary key autoincrement,
    scan_code  integer not null,
    key_name   text    not null,
    date       text    not null,
    count      integer not null default 0,
    unique(scan_code, date)
);
";

const UPSERT: &str = "
insert into keystrokes(scan_code, key_name, date, count)
values (?1, ?2, ?3, 1)
on conflict(scan_code, date)
  do update set count = count + 1,
                key_name = excluded.key_name;
";

/// Seam over the store so [`crate::input::EventHandler`] can be unit
/// tested with an in-memory fake instead of touching disk.
pub trait KeystrokeStore {
    fn write_batch(&mut self, events: &[KeystrokeEvent]) -> Result<(), StoreError>;
}

/// The real, disk-backed keystroke store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if absent) the database at `path`, ensuring parent
    /// directories exist, creating the schema, and setting the durability
    /// pragmas that bound worst-case write latency on the input path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        ensure_parents(path)?;
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self { conn };
        store.create_tables()?;
        store.set_pragmas()?;
        Ok(store)
    }

    /// Opens an in-memory database, used by tests that need the real
    /// upsert SQL without a filesystem path.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: std::path::PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Idempotent schema creation (`IF NOT EXISTS`).
    pub fn create_tables(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA).map_err(StoreError::Schema)
    }

    fn set_pragmas(&self) -> Result<(), StoreError> {
        // WAL mode lets the (separate-process) frontend read concurrently
        // with our writes; synchronous=NORMAL + a larger cache bound the
        // worst-case commit latency on the input path.
        self.conn
            .pragma_update(None, "journal_mode", "WAL")
            .map_err(StoreError::Schema)?;
        self.conn
            .pragma_update(None, "synchronous", "NORMAL")
            .map_err(StoreError::Schema)?;
        self.conn
            .pragma_update(None, "cache_size", 10_000)
            .map_err(StoreError::Schema)?;
        self.conn
            .pragma_update(None, "temp_store", "MEMORY")
            .map_err(StoreError::Schema)?;
        Ok(())
    }

    /// Reads back a single `(scan_code, date)` row. Exposed for tests and
    /// for any same-process embedding that wants to query without shelling
    /// out to `sqlite3`; the on-disk schema itself is the real read contract
    /// external tools rely on.
    pub fn read_row(
        &self,
        scan_code: u32,
        date: &str,
    ) -> Result<Option<KeystrokeRow>, StoreError> {
        self.conn
            .query_row(
                "select id, scan_code, key_name, date, count from keystrokes \
                 where scan_code = ?1 and date = ?2",
                params![scan_code, date],
                |row| {
                    Ok(KeystrokeRow {
                        id: row.get(0)?,
                        scan_code: row.get(1)?,
                        key_name: row.get(2)?,
                        date: row.get(3)?,
                        count: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::Query)
    }
}

impl KeystrokeStore for Store {
    /// Commits `events` as a single transaction using one prepared upsert
    /// statement stepped once per row. A per-row step failure is logged and
    /// skipped; the transaction still commits the rows that succeeded, so
    /// one malformed event does not cost the whole batch.
    fn write_batch(&mut self, events: &[KeystrokeEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let tx = self
            .conn
            .transaction()
            .map_err(StoreError::BeginTransaction)?;

        {
            let mut stmt = tx.prepare(UPSERT).map_err(StoreError::Prepare)?;
            for event in events {
                if let Err(e) = stmt.execute(params![
                    event.scan_code,
                    event.key_name,
                    event.local_date
                ]) {
                    log::error!(
                        "skipping malformed keystroke event (scan_code={}, date={}): {e}",
                        event.scan_code,
                        event.local_date
                    );
                }
            }
        }

        tx.commit().map_err(StoreError::Commit)
    }
}
