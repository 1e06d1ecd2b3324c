//! Bounded, append-oriented snapshot log per logical key.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::backend::SnapshotBackend;
use super::db::{DB_FILE_NAME, SqliteBackend};
use super::fs::FileBackend;
use super::schema::{Snapshot, decode, encode};
use crate::config::{AutosaveConfig, BackendKind};
use crate::error::{AutosaveError, Result};

/// Longest accepted logical key.
pub const MAX_KEY_LEN: usize = 64;

/// Checks that a key is safe to use as a table value and a directory name.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(AutosaveError::InvalidKey {
            key: key.to_string(),
        })
    }
}

fn into_write_error(key: &str, err: AutosaveError) -> AutosaveError {
    match err {
        AutosaveError::StorageWrite { .. } | AutosaveError::InvalidKey { .. } => err,
        other => AutosaveError::StorageWrite {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Snapshot log with strict FIFO retention of `max_entries` per key.
pub struct SnapshotStore {
    backend: Arc<dyn SnapshotBackend>,
    max_entries: usize,
    // Appends and clears hold it exclusively. Reads hold it shared across
    // list and fetch so they see the log either before or after a commit.
    log_lock: RwLock<()>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("backend", &self.backend.name())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl SnapshotStore {
    /// Wraps a backend. `max_entries` is clamped to at least 1.
    pub fn new(backend: Arc<dyn SnapshotBackend>, max_entries: usize) -> Self {
        Self {
            backend,
            max_entries: max_entries.max(1),
            log_lock: RwLock::new(()),
        }
    }

    /// Opens the backend selected by `config`.
    #[instrument(skip_all, fields(backend = config.backend.as_str()))]
    pub fn open(config: &AutosaveConfig) -> Result<Self> {
        let dir = config.resolved_data_dir()?;
        let backend: Arc<dyn SnapshotBackend> = match config.backend {
            BackendKind::Sqlite => Arc::new(SqliteBackend::open(dir.join(DB_FILE_NAME))?),
            BackendKind::Files => Arc::new(FileBackend::new(dir)),
        };
        Ok(Self::new(backend, config.max_entries))
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Serializes `data` and appends it as the newest entry of `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageWrite` if the entry could not be made durable. The
    /// log is unchanged in that case.
    pub fn append<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<Snapshot> {
        let value = serde_json::to_value(data).map_err(|e| AutosaveError::StorageWrite {
            key: key.to_string(),
            reason: format!("Failed to serialize state: {e}"),
        })?;
        self.append_value(key, value)
    }

    /// Appends an already-serialized state, evicting the oldest overflow.
    #[instrument(skip(self, data))]
    pub fn append_value(&self, key: &str, data: Value) -> Result<Snapshot> {
        validate_key(key)?;
        let _guard = self.log_lock.write().unwrap_or_else(PoisonError::into_inner);

        let seqs = self
            .backend
            .list(key)
            .map_err(|e| into_write_error(key, e))?;
        let last_seq = seqs.last().copied();

        let mut timestamp = Utc::now();
        if let Some(prev) = last_seq.and_then(|seq| self.read_entry(key, seq).ok()) {
            // Clock stepped backwards; keep timestamps strictly increasing.
            if timestamp <= prev.timestamp {
                timestamp = prev.timestamp + Duration::milliseconds(1);
            }
        }

        let snapshot = Snapshot {
            seq: last_seq.map_or(1, |seq| seq + 1),
            timestamp,
            data,
        };
        let bytes = encode(key, &snapshot)?;

        let keep = self.max_entries - 1;
        let evict = &seqs[..seqs.len().saturating_sub(keep)];

        self.backend
            .commit(key, snapshot.seq, &bytes, evict)
            .map_err(|e| into_write_error(key, e))?;

        info!(
            key,
            seq = snapshot.seq,
            bytes = bytes.len(),
            evicted = evict.len(),
            "Snapshot appended"
        );
        Ok(snapshot)
    }

    /// Reads and decodes one entry.
    pub fn load(&self, key: &str, seq: u64) -> Result<Snapshot> {
        validate_key(key)?;
        let _guard = self.log_lock.read().unwrap_or_else(PoisonError::into_inner);
        self.read_entry(key, seq)
    }

    // Caller holds `log_lock`.
    fn read_entry(&self, key: &str, seq: u64) -> Result<Snapshot> {
        let bytes = self.backend.read(key, seq)?;
        decode(key, seq, &bytes)
    }

    /// Retained entries for `key`, newest first.
    ///
    /// Never fails: an unreadable log is reported and treated as empty, and
    /// corrupt entries are skipped individually.
    pub fn load_all(&self, key: &str) -> Vec<Snapshot> {
        match self.try_load_all(key) {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!(key, error = %e, "Snapshot log unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Like [`Self::load_all`], but reports a whole-log read failure.
    #[instrument(skip(self))]
    pub fn try_load_all(&self, key: &str) -> Result<Vec<Snapshot>> {
        validate_key(key)?;
        let _guard = self.log_lock.read().unwrap_or_else(PoisonError::into_inner);
        let seqs = self.backend.list(key)?;

        let snapshots: Vec<Snapshot> = seqs
            .iter()
            .rev()
            .take(self.max_entries)
            .filter_map(|&seq| match self.read_entry(key, seq) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(key, seq, error = %e, "Skipping unreadable snapshot");
                    None
                }
            })
            .collect();

        debug!(key, count = snapshots.len(), "Loaded snapshot log");
        Ok(snapshots)
    }

    /// Newest readable entry, if any.
    pub fn load_latest(&self, key: &str) -> Option<Snapshot> {
        self.load_all(key).into_iter().next()
    }

    /// Deletes every entry of `key`. Returns how many were removed.
    #[instrument(skip(self))]
    pub fn clear(&self, key: &str) -> Result<usize> {
        validate_key(key)?;
        let _guard = self.log_lock.write().unwrap_or_else(PoisonError::into_inner);

        let mut removed = 0;
        for seq in self.backend.list(key)? {
            if self.backend.remove(key, seq)? {
                removed += 1;
            }
        }
        info!(key, removed, "Snapshot log cleared");
        Ok(removed)
    }
}
