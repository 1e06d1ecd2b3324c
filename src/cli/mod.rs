//! CLI argument definitions for the `autosave` inspection tool.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Autosave inspector - browse and manage persisted state snapshots.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "autosave", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "AUTOSAVE_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to the autosave configuration file (TOML)
    #[arg(long, short = 'c', global = true, env = "AUTOSAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Snapshot log to inspect (overrides the configured key)
    #[arg(long, short = 'k', global = true)]
    pub key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every snapshot in the log, newest first
    #[command(visible_alias = "ls")]
    List,

    /// List restorable save slots (excludes the two newest entries)
    Slots,

    /// Print one snapshot's state as JSON
    Show(ShowArgs),

    /// Print the newest snapshot's state as JSON
    Latest,

    /// Delete every snapshot in the log
    Clear,

    /// Show the effective configuration
    Config,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Sequence number of the snapshot
    pub seq: u64,
}
