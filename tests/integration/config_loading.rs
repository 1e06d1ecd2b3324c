//! Configuration file tests.

use std::fs;
use std::time::Duration;

use autosave::config::{load_config, load_or_default};
use autosave::{AutosaveConfig, AutosaveError, BackendKind, SnapshotStore};

use crate::common::fixtures::TestWorkspace;

#[test]
fn test_workspace_config_round_trip() {
    let workspace = TestWorkspace::new(BackendKind::Files).with_max_entries(5);
    let path = workspace.write_config();

    let config = load_config(&path).unwrap();
    assert_eq!(config.key, "state");
    assert_eq!(config.max_entries, 5);
    assert_eq!(config.interval(), Duration::from_secs(60));
    assert_eq!(config.backend, BackendKind::Files);
    // Relative to the config file's directory.
    assert_eq!(config.resolved_data_dir().unwrap(), workspace.data_dir());
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autosave.toml");
    fs::write(&path, "max_entries = 4\n").unwrap();

    let config = load_config(&path).unwrap();
    let defaults = AutosaveConfig::default();
    assert_eq!(config.max_entries, 4);
    assert_eq!(config.key, defaults.key);
    assert_eq!(config.interval_secs, defaults.interval_secs);
    assert_eq!(config.backend, BackendKind::Sqlite);
}

#[test]
fn test_zero_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for content in ["max_entries = 0\n", "interval_secs = 0\n"] {
        let path = dir.path().join("autosave.toml");
        fs::write(&path, content).unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, AutosaveError::ConfigInvalid(_)), "{content}");
        assert!(err.is_user_recoverable());
    }
}

#[test]
fn test_unknown_field_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autosave.toml");
    fs::write(&path, "max_entires = 3\n").unwrap();
    assert!(matches!(load_config(&path), Err(AutosaveError::ConfigParse(_))));
}

#[test]
fn test_missing_file_and_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        load_or_default(Some(&missing)),
        Err(AutosaveError::ConfigNotFound { .. })
    ));
    assert_eq!(load_or_default(None).unwrap(), AutosaveConfig::default());
}

#[test]
fn test_config_drives_store_backend() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let config = AutosaveConfig::load(workspace.write_config()).unwrap();
    let store = SnapshotStore::open(&config).unwrap();
    assert_eq!(store.backend_name(), "files");
    assert_eq!(store.max_entries(), 10);
}
