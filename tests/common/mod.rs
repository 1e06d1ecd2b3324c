//! Common test utilities for the autosave engine and CLI.
//!
//! - `cli`: CLI runner with output verification and fluent assertions
//! - `fixtures`: Temporary data directories, config files, and a sample state type
#![allow(dead_code)]

pub mod fixtures;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
