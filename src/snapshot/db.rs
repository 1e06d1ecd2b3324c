//! SQLite backend for snapshot storage.
//!
//! All keys share one `snapshots` table. A commit inserts the new entry and
//! deletes the evicted ones inside a single transaction, so readers see
//! either the old log or the new one.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument, trace};

use super::backend::SnapshotBackend;
use crate::config::default_data_dir;
use crate::error::{AutosaveError, Result};

/// SQLite schema for snapshot storage.
const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS snapshots (
    key TEXT NOT NULL,
    seq INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    data BLOB NOT NULL,
    PRIMARY KEY (key, seq)
);
";

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "autosave.db";

/// SQLite-backed blob storage.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens or creates a database in the standard data directory.
    ///
    /// Location: `~/.local/share/autosave/autosave.db`
    #[instrument]
    pub fn open_default() -> Result<Self> {
        let path = default_db_path()?;
        Self::open(&path)
    }

    /// Opens or creates a database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AutosaveError::Other(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(path = %path.display(), "Opening snapshot database");
        let conn = Connection::open(path)
            .map_err(|e| AutosaveError::Other(format!("Failed to open database: {e}")))?;

        let db = Self::init(conn)?;
        info!(path = %path.display(), "Snapshot database ready");
        Ok(db)
    }

    /// Creates an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AutosaveError::Other(format!("Failed to create in-memory database: {e}"))
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Commits must reach stable storage before append returns.
        conn.pragma_update(None, "synchronous", "FULL")
            .map_err(|e| AutosaveError::Other(format!("Failed to set synchronous mode: {e}")))?;

        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| AutosaveError::Other(format!("Failed to initialize schema: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_sql_seq(key: &str, seq: u64) -> Result<i64> {
    i64::try_from(seq).map_err(|_| AutosaveError::StorageWrite {
        key: key.to_string(),
        reason: format!("sequence {seq} out of range"),
    })
}

impl SnapshotBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self))]
    fn list(&self, key: &str) -> Result<Vec<u64>> {
        let read_err = |e: rusqlite::Error| AutosaveError::StorageRead {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT seq FROM snapshots WHERE key = ?1 ORDER BY seq ASC")
            .map_err(read_err)?;

        let seqs: Vec<i64> = stmt
            .query_map(params![key], |row| row.get(0))
            .map_err(read_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err)?;

        let seqs: Vec<u64> = seqs.into_iter().filter_map(|s| u64::try_from(s).ok()).collect();
        trace!(count = seqs.len(), "Listed snapshot seqs");
        Ok(seqs)
    }

    #[instrument(skip(self))]
    fn read(&self, key: &str, seq: u64) -> Result<Vec<u8>> {
        let Ok(sql_seq) = i64::try_from(seq) else {
            return Err(AutosaveError::EntryNotFound {
                key: key.to_string(),
                seq,
            });
        };

        let data: Option<Vec<u8>> = self
            .conn()
            .query_row(
                "SELECT data FROM snapshots WHERE key = ?1 AND seq = ?2",
                params![key, sql_seq],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AutosaveError::StorageRead {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        data.ok_or_else(|| AutosaveError::EntryNotFound {
            key: key.to_string(),
            seq,
        })
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    fn commit(&self, key: &str, seq: u64, bytes: &[u8], evict: &[u64]) -> Result<()> {
        let write_err = |e: rusqlite::Error| AutosaveError::StorageWrite {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(write_err)?;

        tx.execute(
            "INSERT INTO snapshots (key, seq, created_at, data) VALUES (?1, ?2, ?3, ?4)",
            params![key, to_sql_seq(key, seq)?, now, bytes],
        )
        .map_err(write_err)?;

        for &old in evict {
            trace!(seq = old, "Evicting snapshot");
            tx.execute(
                "DELETE FROM snapshots WHERE key = ?1 AND seq = ?2",
                params![key, to_sql_seq(key, old)?],
            )
            .map_err(write_err)?;
        }

        tx.commit().map_err(write_err)?;
        debug!(seq, evicted = evict.len(), "Snapshot committed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str, seq: u64) -> Result<bool> {
        let deleted = self
            .conn()
            .execute(
                "DELETE FROM snapshots WHERE key = ?1 AND seq = ?2",
                params![key, to_sql_seq(key, seq)?],
            )
            .map_err(|e| AutosaveError::StorageWrite {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(deleted > 0)
    }
}

/// Returns the default database path.
///
/// Location: `~/.local/share/autosave/autosave.db`
pub fn default_db_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join(DB_FILE_NAME))
}
