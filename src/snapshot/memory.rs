//! In-memory backend for tests.
//!
//! Records every commit and supports failure injection so callers can
//! exercise write errors, unreadable logs, and corrupted entries.
//!
//! # Example
//!
//! ```rust,ignore
//! use autosave::snapshot::{MemoryBackend, SnapshotStore};
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let store = SnapshotStore::new(backend.clone(), 10);
//!
//! backend.fail_next_writes(1);
//! assert!(store.append("state", &json!({"a": 1})).is_err());
//! ```

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use super::backend::SnapshotBackend;
use crate::error::{AutosaveError, Result};

#[derive(Debug, Default)]
struct Inner {
    logs: BTreeMap<String, BTreeMap<u64, Vec<u8>>>,
    fail_writes: usize,
    fail_reads: bool,
    commits: usize,
}

/// Mutex-guarded blob map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `count` commits fail with `StorageWrite`.
    pub fn fail_next_writes(&self, count: usize) {
        debug!(count, "Injecting write failures");
        self.inner().fail_writes = count;
    }

    /// Make `list` fail with `StorageRead` until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        debug!(fail, "Injecting read failures");
        self.inner().fail_reads = fail;
    }

    /// Overwrite a stored entry with garbage. Returns false if absent.
    pub fn corrupt(&self, key: &str, seq: u64) -> bool {
        let mut inner = self.inner();
        match inner.logs.get_mut(key).and_then(|log| log.get_mut(&seq)) {
            Some(bytes) => {
                *bytes = b"\x00corrupt".to_vec();
                true
            }
            None => false,
        }
    }

    /// Store raw bytes directly, bypassing eviction.
    pub fn insert_raw(&self, key: &str, seq: u64, bytes: Vec<u8>) {
        self.inner()
            .logs
            .entry(key.to_string())
            .or_default()
            .insert(seq, bytes);
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> usize {
        self.inner().commits
    }
}

impl SnapshotBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn list(&self, key: &str) -> Result<Vec<u64>> {
        let inner = self.inner();
        if inner.fail_reads {
            return Err(AutosaveError::StorageRead {
                key: key.to_string(),
                reason: "injected read failure".to_string(),
            });
        }
        Ok(inner
            .logs
            .get(key)
            .map(|log| log.keys().copied().collect())
            .unwrap_or_default())
    }

    fn read(&self, key: &str, seq: u64) -> Result<Vec<u8>> {
        self.inner()
            .logs
            .get(key)
            .and_then(|log| log.get(&seq))
            .cloned()
            .ok_or_else(|| AutosaveError::EntryNotFound {
                key: key.to_string(),
                seq,
            })
    }

    fn commit(&self, key: &str, seq: u64, bytes: &[u8], evict: &[u64]) -> Result<()> {
        let mut inner = self.inner();
        if inner.fail_writes > 0 {
            inner.fail_writes -= 1;
            return Err(AutosaveError::StorageWrite {
                key: key.to_string(),
                reason: "injected write failure".to_string(),
            });
        }

        let log = inner.logs.entry(key.to_string()).or_default();
        log.insert(seq, bytes.to_vec());
        for old in evict {
            log.remove(old);
        }
        inner.commits += 1;
        trace!(key, seq, "Memory commit");
        Ok(())
    }

    fn remove(&self, key: &str, seq: u64) -> Result<bool> {
        Ok(self
            .inner()
            .logs
            .get_mut(key)
            .is_some_and(|log| log.remove(&seq).is_some()))
    }
}
