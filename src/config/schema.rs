//! Autosave configuration schema.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::path::{default_data_dir, resolve_path};
use crate::error::{AutosaveError, Result};

/// Default logical key for the application state log.
pub const DEFAULT_KEY: &str = "state";

/// Default number of retained snapshots per key.
pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// Default seconds between capture ticks.
pub const DEFAULT_INTERVAL_SECS: u64 = 180;

/// Storage medium for the snapshot log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// One SQLite database for all keys.
    #[default]
    Sqlite,
    /// One directory per key, one file per snapshot.
    Files,
}

impl BackendKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Files => "files",
        }
    }
}

/// Engine configuration.
///
/// Example:
///
/// ```toml
/// key = "state"
/// max_entries = 10
/// interval_secs = 180
/// backend = "sqlite"
/// data_dir = "~/.local/share/lightshow/autosave"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutosaveConfig {
    /// Logical key of the snapshot log.
    pub key: String,
    /// Maximum retained snapshots (N).
    pub max_entries: usize,
    /// Seconds between capture ticks.
    pub interval_secs: u64,
    /// Storage medium.
    pub backend: BackendKind,
    /// Storage location; platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
            interval_secs: DEFAULT_INTERVAL_SECS,
            backend: BackendKind::default(),
            data_dir: None,
        }
    }
}

impl AutosaveConfig {
    /// Validate value ranges and the key.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(AutosaveError::ConfigInvalid(
                "max_entries must be at least 1".to_string(),
            ));
        }
        if self.interval_secs == 0 {
            return Err(AutosaveError::ConfigInvalid(
                "interval_secs must be at least 1".to_string(),
            ));
        }
        crate::snapshot::validate_key(&self.key)
    }

    /// Reads and validates a TOML file. See [`super::load_config`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        super::load_config(path)
    }

    /// Capture interval as a `Duration`.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Storage directory with `~` expanded.
    ///
    /// Relative paths resolve against the current directory; [`super::load_config`]
    /// has already made them absolute relative to the config file.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => {
                let cwd = std::env::current_dir()?;
                resolve_path(dir, &cwd)
            }
            None => default_data_dir(),
        }
    }

    /// Builder-style key override.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Builder-style data directory override.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Builder-style retention override.
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Builder-style backend override.
    pub const fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }
}
