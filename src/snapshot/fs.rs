//! Plain-file backend for snapshot storage.
//!
//! # Directory Structure
//!
//! ```text
//! <root>/
//! └── state/
//!     ├── 00000000000000000041.json
//!     ├── 00000000000000000042.json
//!     └── .00000000000000000043.tmp   # in-flight write, never listed
//! ```
//!
//! New entries are written to a hidden temp file, fsynced, then renamed into
//! place, so a reader sees either the whole entry or nothing.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace, warn};

use super::backend::SnapshotBackend;
use crate::error::{AutosaveError, Result};

const ENTRY_EXT: &str = "json";

/// Directory-per-key blob storage.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`. The directory is created lazily.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_dir(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn entry_path(&self, key: &str, seq: u64) -> PathBuf {
        self.key_dir(key).join(format!("{seq:020}.{ENTRY_EXT}"))
    }

    fn temp_path(&self, key: &str, seq: u64) -> PathBuf {
        self.key_dir(key).join(format!(".{seq:020}.tmp"))
    }

    /// Runs after the rename has published the entry. From here on the
    /// commit counts as done; failures only cost durability or leave extra
    /// history.
    fn finish_commit(&self, key: &str, dir_synced: io::Result<()>, evict: &[u64]) {
        if let Err(e) = dir_synced {
            warn!(key, error = %e, "Directory fsync failed after publish");
        }
        for &old in evict {
            if let Err(e) = self.remove(key, old) {
                warn!(seq = old, error = %e, "Failed to evict snapshot");
            }
        }
    }
}

/// Parses `00000000000000000042.json` into 42.
fn parse_entry_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(ENTRY_EXT)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn write_durable(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

impl SnapshotBackend for FileBackend {
    fn name(&self) -> &'static str {
        "files"
    }

    #[instrument(skip(self))]
    fn list(&self, key: &str) -> Result<Vec<u64>> {
        let dir = self.key_dir(key);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(dir = %dir.display(), "No snapshot directory yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AutosaveError::StorageRead {
                    key: key.to_string(),
                    reason: format!("{}: {e}", dir.display()),
                });
            }
        };

        let mut seqs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AutosaveError::StorageRead {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            let name = entry.file_name();
            match name.to_str().and_then(parse_entry_name) {
                Some(seq) => seqs.push(seq),
                None => trace!(name = ?name, "Ignoring non-entry file"),
            }
        }

        seqs.sort_unstable();
        Ok(seqs)
    }

    #[instrument(skip(self))]
    fn read(&self, key: &str, seq: u64) -> Result<Vec<u8>> {
        let path = self.entry_path(key, seq);
        fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AutosaveError::EntryNotFound {
                    key: key.to_string(),
                    seq,
                }
            } else {
                AutosaveError::StorageRead {
                    key: key.to_string(),
                    reason: format!("{}: {e}", path.display()),
                }
            }
        })
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    fn commit(&self, key: &str, seq: u64, bytes: &[u8], evict: &[u64]) -> Result<()> {
        let write_err = |e: io::Error| AutosaveError::StorageWrite {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let dir = self.key_dir(key);
        fs::create_dir_all(&dir).map_err(write_err)?;

        let tmp = self.temp_path(key, seq);
        let target = self.entry_path(key, seq);

        if let Err(e) = write_durable(&tmp, bytes).and_then(|()| fs::rename(&tmp, &target)) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        debug!(path = %target.display(), "Snapshot published");
        self.finish_commit(key, sync_dir(&dir), evict);
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str, seq: u64) -> Result<bool> {
        match fs::remove_file(self.entry_path(key, seq)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AutosaveError::StorageWrite {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
