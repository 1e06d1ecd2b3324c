//! Robot mode JSON output implementation.

use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::error::AutosaveError;

use super::{ConfigView, LogListing, Output, RobotFormat, SnapshotView};

/// JSON output implementation for AI agents and scripting.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn render<T: Serialize + ?Sized>(&self, data: &T) -> Option<String> {
        let rendered = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        match rendered {
            Ok(json) => {
                trace!(json_len = json.len(), "JSON serialized");
                Some(json)
            }
            Err(e) => {
                warn!(error = %e, "JSON serialization failed");
                None
            }
        }
    }

    /// Output any serializable data as JSON to stdout.
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        if let Some(json) = self.render(data) {
            println!("{json}");
        }
    }

    /// Output JSON to stderr.
    fn output_json_stderr<T: Serialize + ?Sized>(&self, data: &T) {
        if let Some(json) = self.render(data) {
            eprintln!("{json}");
        }
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &AutosaveError) {
        debug!(error = %error, "Robot: error");
        self.output_json_stderr(&serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        }));
    }

    #[instrument(skip(self))]
    fn info(&self, message: &str) {
        self.output_json(&serde_json::json!({
            "info": true,
            "message": message
        }));
    }

    #[instrument(skip_all, fields(key = listing.key, count = listing.count))]
    fn snapshot_list(&self, listing: &LogListing<'_>) {
        debug!("Robot: snapshot_list");
        self.output_json(listing);
    }

    #[instrument(skip_all, fields(key = listing.key, count = listing.count))]
    fn slot_list(&self, listing: &LogListing<'_>) {
        debug!("Robot: slot_list");
        self.output_json(listing);
    }

    #[instrument(skip_all, fields(key = view.key, seq = view.summary.seq))]
    fn snapshot(&self, view: &SnapshotView<'_>) {
        debug!("Robot: snapshot");
        self.output_json(view);
    }

    #[instrument(skip(self))]
    fn cleared(&self, key: &str, removed: usize) {
        self.output_json(&serde_json::json!({
            "success": true,
            "key": key,
            "removed": removed,
        }));
    }

    fn config(&self, view: &ConfigView<'_>) {
        self.output_json(view);
    }
}
