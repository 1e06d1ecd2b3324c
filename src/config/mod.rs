//! Configuration for the autosave engine.
//!
//! Settings come from an optional TOML file; every field has a default.

mod loader;
mod path;
mod schema;

pub use loader::{load_config, load_or_default, parse_config, render_config};
pub use path::{default_data_dir, home_dir, resolve_path, APP_DIR_NAME};
pub use schema::{
    AutosaveConfig, BackendKind, DEFAULT_INTERVAL_SECS, DEFAULT_KEY, DEFAULT_MAX_ENTRIES,
};
