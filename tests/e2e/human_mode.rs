//! Human-mode end-to-end tests.

use assert_cmd::Command;
use autosave::BackendKind;
use predicates::prelude::*;

use crate::common::cli::CliRunner;
use crate::common::fixtures::{Show, TestWorkspace};

fn inspector(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("autosave").unwrap();
    cmd.env("RUST_LOG", "off")
        .env_remove("AUTOSAVE_FORMAT")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn human_list_shows_rows() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let config = workspace.write_config();
    let store = workspace.store();
    store.append("state", &Show::scene(1)).unwrap();
    store.append("state", &Show::scene(2)).unwrap();

    inspector(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshots"))
        .stdout(predicate::str::contains("#2"))
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("just now"));
}

#[test]
fn human_slots_empty_message() {
    let workspace = TestWorkspace::new(BackendKind::Sqlite);
    let config = workspace.write_config();
    let store = workspace.store();
    store.append("state", &Show::scene(1)).unwrap();
    store.append("state", &Show::scene(2)).unwrap();

    inspector(&config)
        .arg("slots")
        .assert()
        .success()
        .stdout(predicate::str::contains("No restorable slots yet"));
}

#[test]
fn human_show_prints_pretty_json() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let config = workspace.write_config();
    workspace.store().append("state", &Show::scene(3)).unwrap();

    inspector(&config)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"scene\": 3"));
}

#[test]
fn human_error_has_hint() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let config = workspace.write_config();

    inspector(&config)
        .args(["show", "5"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("[ERR]"))
        .stderr(predicate::str::contains("Hint: Run: autosave list"));
}

#[test]
fn human_clear_reports_count() {
    let workspace = TestWorkspace::new(BackendKind::Sqlite);
    let config = workspace.write_config();
    workspace.store().append("state", &Show::scene(1)).unwrap();

    CliRunner::new()
        .with_config(&config)
        .run(&["clear"])
        .assert_success()
        .assert_stdout_contains("Removed 1 snapshot(s) from 'state'");
}

#[test]
fn human_config_lists_fields() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let config = workspace.write_config();

    inspector(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("backend"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("60s"));
}
