//! Output mode abstraction for robot and human output.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::cli::Cli;
use crate::config::AutosaveConfig;
use crate::error::AutosaveError;
use crate::snapshot::SnapshotSummary;

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// A listing of one snapshot log.
#[derive(Debug, Clone, Serialize)]
pub struct LogListing<'a> {
    pub key: &'a str,
    pub count: usize,
    pub entries: &'a [SnapshotSummary],
}

/// One snapshot with its state.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotView<'a> {
    pub key: &'a str,
    #[serde(flatten)]
    pub summary: SnapshotSummary,
    pub data: &'a Value,
}

/// Effective configuration plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub data_dir: String,
    pub config: &'a AutosaveConfig,
}

impl<'a> ConfigView<'a> {
    pub fn new(config: &'a AutosaveConfig, source: Option<&Path>, data_dir: &Path) -> Self {
        Self {
            source: source.map(|p| p.display().to_string()),
            data_dir: data_dir.display().to_string(),
            config,
        }
    }
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for AI agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output for human users.
    Human,
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            if cli.use_compact_json() {
                Self::Robot(RobotFormat::JsonCompact)
            } else {
                Self::Robot(RobotFormat::Json)
            }
        } else {
            Self::Human
        }
    }

    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human => Box::new(HumanOutput::new()),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    fn error(&self, error: &AutosaveError);
    fn info(&self, message: &str);

    /// Every entry in a log, newest first.
    fn snapshot_list(&self, listing: &LogListing<'_>);

    /// Restorable save slots, newest first.
    fn slot_list(&self, listing: &LogListing<'_>);

    /// One snapshot including its state.
    fn snapshot(&self, view: &SnapshotView<'_>);

    /// The log for `key` was emptied.
    fn cleared(&self, key: &str, removed: usize);

    fn config(&self, view: &ConfigView<'_>);
}
