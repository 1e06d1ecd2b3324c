//! Loading the autosave configuration from TOML files.

use std::path::Path;

use tracing::{debug, info, instrument, trace};

use super::path::resolve_path;
use super::schema::AutosaveConfig;
use crate::error::{AutosaveError, Result};

/// Load a configuration file.
///
/// A relative `data_dir` is resolved against the file's directory.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file content cannot be parsed
/// - Validation fails
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AutosaveConfig> {
    let path = path.as_ref();
    info!("Loading configuration file");

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AutosaveError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            AutosaveError::Io(e)
        }
    })?;
    debug!(bytes = content.len(), "Read config file");

    let mut config = parse_config(&content)?;

    if let Some(dir) = config.data_dir.take() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.data_dir = Some(resolve_path(&dir, base)?);
    }

    config.validate()?;
    info!(
        key = %config.key,
        max_entries = config.max_entries,
        interval_secs = config.interval_secs,
        backend = config.backend.as_str(),
        "Configuration loaded and validated"
    );
    Ok(config)
}

/// Load a configuration file if a path is given, else the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<AutosaveConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            debug!("No config file given, using defaults");
            Ok(AutosaveConfig::default())
        }
    }
}

/// Parse TOML content without validating it.
pub fn parse_config(content: &str) -> Result<AutosaveConfig> {
    trace!(content_len = content.len(), "Parsing config content");
    toml::from_str(content).map_err(|e| AutosaveError::ConfigParse(format!("TOML: {e}")))
}

/// Render a configuration as TOML.
pub fn render_config(config: &AutosaveConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AutosaveError::ConfigParse(format!("TOML: {e}")))
}
