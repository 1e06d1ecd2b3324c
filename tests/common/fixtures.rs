//! Test fixture helpers for creating temporary snapshot stores.
//!
//! Every workspace lives in a `TempDir` that is removed on drop.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use autosave::{AutosaveConfig, BackendKind, SnapshotStore};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

/// Sample host state: a lighting show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub name: String,
    pub scene: u32,
    pub master: f64,
    #[serde(default)]
    pub cues: Vec<String>,
}

impl Show {
    #[must_use]
    pub fn scene(n: u32) -> Self {
        Self {
            name: "club".to_string(),
            scene: n,
            master: 1.0,
            cues: vec![format!("cue-{n}")],
        }
    }
}

/// A temporary data directory with an autosave config file.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub backend: BackendKind,
    pub max_entries: usize,
}

impl TestWorkspace {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new(backend: BackendKind) -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            backend,
            max_entries: 10,
        }
    }

    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    #[must_use]
    pub fn config(&self) -> AutosaveConfig {
        AutosaveConfig::default()
            .with_backend(self.backend)
            .with_max_entries(self.max_entries)
            .with_data_dir(self.data_dir())
    }

    /// # Panics
    ///
    /// Panics if the backend cannot be opened.
    #[must_use]
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::new(SnapshotStore::open(&self.config()).expect("Failed to open store"))
    }

    /// Writes `autosave.toml` pointing at this workspace's data dir.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn write_config(&self) -> PathBuf {
        let path = self.dir.path().join("autosave.toml");
        let content = format!(
            "key = \"state\"\nmax_entries = {}\ninterval_secs = 60\nbackend = \"{}\"\ndata_dir = \"data\"\n",
            self.max_entries,
            self.backend.as_str()
        );
        fs::write(&path, content).expect("Failed to write config");
        path
    }
}
