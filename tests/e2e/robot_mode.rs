//! Robot-mode end-to-end tests.

use autosave::BackendKind;
use serde_json::{json, Value};

use crate::common::cli::CliRunner;
use crate::common::fixtures::{Show, TestWorkspace};
use crate::common::init_test_logging;

fn seeded(backend: BackendKind, count: u32) -> (TestWorkspace, CliRunner) {
    let workspace = TestWorkspace::new(backend);
    let config = workspace.write_config();
    let store = workspace.store();
    for n in 1..=count {
        store.append("state", &Show::scene(n)).unwrap();
    }
    let cli = CliRunner::new().with_config(&config);
    (workspace, cli)
}

#[test]
fn robot_list_on_empty_log() {
    init_test_logging();
    let (_workspace, cli) = seeded(BackendKind::Files, 0);
    cli.run_robot(&["list"])
        .assert_success()
        .assert_json_field("/key", &json!("state"))
        .assert_json_field("/count", &json!(0))
        .assert_json_field("/entries", &json!([]));
}

#[test]
fn robot_list_is_newest_first() {
    for backend in [BackendKind::Files, BackendKind::Sqlite] {
        let (_workspace, cli) = seeded(backend, 3);
        let result = cli.run_robot(&["list"]);
        result
            .assert_success()
            .assert_json_field("/count", &json!(3))
            .assert_json_field("/entries/0/elapsed", &json!("just now"));
        assert_eq!(result.entry_seqs(), vec![3, 2, 1], "backend {}", backend.as_str());
        assert!(result.json().pointer("/entries/0/timestamp").is_some());
    }
}

#[test]
fn robot_slots_skip_two_newest() {
    let (_workspace, cli) = seeded(BackendKind::Sqlite, 4);
    let result = cli.run_robot(&["slots"]);
    result.assert_success().assert_json_field("/count", &json!(2));
    assert_eq!(result.entry_seqs(), vec![2, 1]);
}

#[test]
fn robot_show_prints_state() {
    let (_workspace, cli) = seeded(BackendKind::Files, 3);
    cli.run_robot(&["show", "2"])
        .assert_success()
        .assert_json_field("/seq", &json!(2))
        .assert_json_field("/data/scene", &json!(2))
        .assert_json_field("/data/cues/0", &json!("cue-2"));
}

#[test]
fn robot_show_missing_entry_errors_on_stderr() {
    let (_workspace, cli) = seeded(BackendKind::Files, 1);
    let result = cli.run_robot(&["show", "99"]);
    result.assert_failure();
    assert!(result.stdout.trim().is_empty());

    let err = result.stderr_json();
    assert_eq!(err["error"], json!(true));
    assert_eq!(err["recoverable"], json!(true));
    assert_eq!(err["suggestion"], json!("Run: autosave list"));
    assert!(err["message"].as_str().unwrap().contains("99"));
}

#[test]
fn robot_latest() {
    let (_workspace, cli) = seeded(BackendKind::Sqlite, 2);
    cli.run_robot(&["latest"])
        .assert_success()
        .assert_json_field("/seq", &json!(2))
        .assert_json_field("/data/scene", &json!(2));
}

#[test]
fn robot_latest_on_empty_log_fails() {
    let (_workspace, cli) = seeded(BackendKind::Files, 0);
    let result = cli.run_robot(&["latest"]);
    result.assert_failure();
    assert_eq!(result.stderr_json()["error"], json!(true));
}

#[test]
fn robot_clear_then_list() {
    let (_workspace, cli) = seeded(BackendKind::Files, 3);
    cli.run_robot(&["clear"])
        .assert_success()
        .assert_json_field("/removed", &json!(3));
    cli.run_robot(&["list"])
        .assert_success()
        .assert_json_field("/count", &json!(0));
}

#[test]
fn robot_key_override() {
    let (workspace, cli) = seeded(BackendKind::Sqlite, 1);
    workspace
        .store()
        .append("show_b", &Show::scene(7))
        .unwrap();

    cli.run_robot(&["--key", "show_b", "latest"])
        .assert_success()
        .assert_json_field("/key", &json!("show_b"))
        .assert_json_field("/data/scene", &json!(7));
}

#[test]
fn robot_invalid_key_is_rejected() {
    let (_workspace, cli) = seeded(BackendKind::Files, 0);
    let result = cli.run_robot(&["--key", "../etc", "list"]);
    result.assert_failure();

    let err = result.stderr_json();
    assert_eq!(err["recoverable"], json!(true));
    assert!(err["suggestion"].is_string());
}

#[test]
fn robot_config_reports_effective_settings() {
    let (workspace, cli) = seeded(BackendKind::Files, 0);
    let result = cli.run_robot(&["config"]);
    result
        .assert_success()
        .assert_json_field("/config/backend", &json!("files"))
        .assert_json_field("/config/max_entries", &json!(10))
        .assert_json_field("/config/interval_secs", &json!(60));

    let json = result.json();
    let data_dir = json["data_dir"].as_str().unwrap();
    assert_eq!(data_dir, workspace.data_dir().display().to_string());
    assert!(json["source"].as_str().unwrap().ends_with("autosave.toml"));
}

#[test]
fn robot_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let result = CliRunner::new().with_config(&missing).run_robot(&["list"]);
    result.assert_failure();

    let err = result.stderr_json();
    assert_eq!(err["suggestion"], json!("Check --config or AUTOSAVE_CONFIG"));
}

#[test]
fn compact_format_is_single_line() {
    let (_workspace, cli) = seeded(BackendKind::Files, 2);
    let result = cli.run(&["--format", "json-compact", "list"]);
    result.assert_success();

    assert_eq!(result.stdout.trim().lines().count(), 1);
    let json: Value = result.json();
    assert_eq!(json["count"], json!(2));
}
