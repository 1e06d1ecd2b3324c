//! Error types for autosave operations.

use thiserror::Error;

/// A decoded snapshot could not be migrated to the current state schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("State normalization failed: {reason}")]
pub struct NormalizationError {
    pub reason: String,
}

impl NormalizationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Primary error type for autosave operations.
#[derive(Error, Debug)]
pub enum AutosaveError {
    // Storage errors
    #[error("Failed to write snapshot for '{key}': {reason}")]
    StorageWrite { key: String, reason: String },

    #[error("Failed to read snapshot log for '{key}': {reason}")]
    StorageRead { key: String, reason: String },

    #[error("Snapshot {seq} of '{key}' is unreadable: {reason}")]
    EntryDecode {
        key: String,
        seq: u64,
        reason: String,
    },

    #[error("Snapshot {seq} not found in '{key}'")]
    EntryNotFound { key: String, seq: u64 },

    #[error("Invalid snapshot key '{key}': use letters, digits, '-' or '_'")]
    InvalidKey { key: String },

    // Restore errors
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AutosaveError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound { .. }
                | Self::InvalidKey { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse(_)
                | Self::ConfigInvalid(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::StorageWrite { .. } => Some("Check free disk space and permissions on the data directory"),
            Self::EntryNotFound { .. } => Some("Run: autosave list"),
            Self::InvalidKey { .. } => Some("Use a key such as 'state'"),
            Self::ConfigNotFound { .. } => Some("Check --config or AUTOSAVE_CONFIG"),
            Self::ConfigInvalid(_) => Some("max_entries and interval_secs must be at least 1"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using AutosaveError.
pub type Result<T> = std::result::Result<T, AutosaveError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| AutosaveError::Other(format!("{}: {e}", f().into())))
    }
}
