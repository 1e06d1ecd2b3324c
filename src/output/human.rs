//! Human-friendly output implementation using console styling.

use console::style;
use tracing::{debug, instrument};

use crate::error::AutosaveError;
use crate::snapshot::SnapshotSummary;

use super::{ConfigView, LogListing, Output, SnapshotView};

/// Styled terminal output implementation for human users.
#[derive(Debug, Default)]
pub struct HumanOutput;

impl HumanOutput {
    pub const fn new() -> Self {
        Self
    }

    fn print_rows(entries: &[SnapshotSummary]) {
        for entry in entries {
            println!(
                "  {:>6}  {}  {}",
                style(format!("#{}", entry.seq)).cyan().bold(),
                entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                style(&entry.elapsed).dim()
            );
        }
    }

    fn header(title: &str, key: &str, count: usize) {
        println!(
            "{} {} ({count})",
            style(title).bold(),
            style(format!("[{key}]")).magenta()
        );
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &AutosaveError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        eprintln!("{} {error}", style("[ERR]").red().bold());
        if let Some(suggestion) = error.suggestion() {
            eprintln!("  {} {suggestion}", style("Hint:").yellow());
        }
    }

    fn info(&self, message: &str) {
        println!("{} {message}", style("[INFO]").blue().bold());
    }

    fn snapshot_list(&self, listing: &LogListing<'_>) {
        Self::header("Snapshots", listing.key, listing.count);
        if listing.entries.is_empty() {
            println!("  {}", style("No snapshots persisted yet").dim());
            return;
        }
        Self::print_rows(listing.entries);
    }

    fn slot_list(&self, listing: &LogListing<'_>) {
        Self::header("Save slots", listing.key, listing.count);
        if listing.entries.is_empty() {
            println!("  {}", style("No restorable slots yet").dim());
            return;
        }
        Self::print_rows(listing.entries);
    }

    fn snapshot(&self, view: &SnapshotView<'_>) {
        println!(
            "{} {} {}",
            style(format!("#{}", view.summary.seq)).cyan().bold(),
            view.summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            style(&view.summary.elapsed).dim()
        );
        match serde_json::to_string_pretty(view.data) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{} {e}", style("[ERR]").red().bold()),
        }
    }

    fn cleared(&self, key: &str, removed: usize) {
        println!(
            "{} Removed {removed} snapshot(s) from '{key}'",
            style("[OK]").green().bold()
        );
    }

    fn config(&self, view: &ConfigView<'_>) {
        let source = view.source.as_deref().unwrap_or("(defaults)");
        println!("{:<14}{source}", style("source").bold());
        println!("{:<14}{}", style("key").bold(), view.config.key);
        println!("{:<14}{}", style("backend").bold(), view.config.backend.as_str());
        println!("{:<14}{}", style("max_entries").bold(), view.config.max_entries);
        println!("{:<14}{}s", style("interval").bold(), view.config.interval_secs);
        println!("{:<14}{}", style("data_dir").bold(), view.data_dir);
    }
}
