//! SQLite-backed key-value store.
//!
//! One physical file holds one `entries` table mapping a unique text key to
//! an opaque, versioned value payload. Many independent processes may open
//! the same file; every operation runs in its own short transaction and
//! retries transient lock contention with bounded backoff.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::StoreError;
use crate::retry::{RetryConfig, with_retry};

/// Version tag written alongside every payload. Bump when the value
/// encoding changes; readers reject versions they do not know.
pub const FORMAT_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    format INTEGER NOT NULL,
    value BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// A key-value store backed by a single SQLite file.
///
/// Writes are atomic: a `dump` either fully replaces any prior entry for
/// the key or fully fails. Concurrent writers on disjoint keys both
/// succeed; same-key races resolve to the last committed transaction.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    retry: RetryConfig,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if necessary) the store at `path` with default
    /// retry behavior.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(path, RetryConfig::default())
    }

    /// Open (creating if necessary) the store at `path`.
    ///
    /// Runs a basic integrity check; a file that is not a SQLite database
    /// or fails the check is reported as [`StoreError::Corrupt`].
    pub fn open_with(path: impl AsRef<Path>, retry: RetryConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .map_err(|e| StoreError::Database(format!("failed to open {:?}: {}", path, e)))?;

        let check: String = with_retry(&retry, "integrity check", || {
            conn.query_row("PRAGMA quick_check", [], |row| row.get(0))
        })?;
        if check != "ok" {
            return Err(StoreError::Corrupt(format!(
                "{:?} failed quick_check: {}",
                path, check
            )));
        }

        with_retry(&retry, "schema init", || conn.execute_batch(SCHEMA))?;

        debug!("Opened store at {:?}", path);
        Ok(Self { conn, retry, path })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `value` and commit it under `key`, replacing any prior
    /// entry for that key.
    pub fn dump<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(value).map_err(|e| {
            StoreError::Serialization(format!("failed to encode value for {:?}: {}", key, e))
        })?;
        let conn = &mut self.conn;
        with_retry(&self.retry, "dump", move || {
            // Stamped per attempt, so a write that sat out contention
            // carries its commit time, not its first attempt's.
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO entries (key, format, value, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                     format = excluded.format,
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, FORMAT_VERSION, payload, now],
            )?;
            tx.commit()
        })?;

        debug!("Stored entry {:?} in {:?}", key, self.path);
        Ok(())
    }

    /// Load the value previously dumped under `key`, or `None` if the key
    /// was never written.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let row = with_retry(&self.retry, "load", || {
            self.conn
                .query_row(
                    "SELECT format, value FROM entries WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)),
                )
                .optional()
        })?;

        match row {
            None => Ok(None),
            Some((format, payload)) => Ok(Some(decode(key, format, &payload)?)),
        }
    }

    /// Snapshot the full mapping of every key currently present.
    pub fn load_all<T: DeserializeOwned>(&self) -> Result<HashMap<String, T>, StoreError> {
        let rows = with_retry(&self.retry, "load_all", || {
            let tx = self.conn.unchecked_transaction()?;
            let mut stmt = tx.prepare("SELECT key, format, value FROM entries")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            drop(stmt);
            tx.commit()?;
            Ok(rows)
        })?;

        let mut out = HashMap::with_capacity(rows.len());
        for (key, format, payload) in rows {
            let value = decode(&key, format, &payload)?;
            out.insert(key, value);
        }
        Ok(out)
    }

    /// Remove the entry for `key`, if present. Deletion is always an
    /// explicit caller decision; the store never drops entries on its own.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let conn = &mut self.conn;
        with_retry(&self.retry, "delete", move || {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
            tx.commit()
        })?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &str, format: i64, payload: &[u8]) -> Result<T, StoreError> {
    if format != FORMAT_VERSION {
        return Err(StoreError::UnsupportedFormat(format));
    }
    serde_json::from_slice(payload).map_err(|e| {
        StoreError::Serialization(format!("failed to decode value for {:?}: {}", key, e))
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
