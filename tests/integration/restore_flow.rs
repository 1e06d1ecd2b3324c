//! Startup restore and save-slot tests.

use std::sync::Arc;

use autosave::{
    Autosave, BackendKind, CaptureOutcome, JsonSchema, RestoreResult, SharedState,
    WORKING_ENTRIES,
};
use serde_json::json;

use crate::common::fixtures::{Show, TestWorkspace};
use crate::common::init_test_logging;

fn open(workspace: &TestWorkspace, live: &Arc<SharedState<Show>>) -> Autosave<SharedState<Show>, JsonSchema<Show>> {
    Autosave::open(workspace.config(), Arc::clone(live), JsonSchema::new()).unwrap()
}

#[tokio::test]
async fn test_persist_then_restore_in_new_session() {
    init_test_logging();
    let workspace = TestWorkspace::new(BackendKind::Sqlite);
    let edited = Show {
        name: "festival".to_string(),
        scene: 12,
        master: 0.5,
        cues: vec!["intro".to_string(), "drop".to_string()],
    };

    {
        let live = Arc::new(SharedState::new(edited.clone()));
        let session = open(&workspace, &live);
        assert!(matches!(session.capture_now().await, CaptureOutcome::Persisted(_)));
    }

    let live = Arc::new(SharedState::new(Show::default()));
    let session = open(&workspace, &live);
    session.apply_latest_or_default();

    assert_eq!(live.get(), edited);
    assert_eq!(live.replacement_count(), 1);
}

#[test]
fn test_empty_history_restores_default() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let live = Arc::new(SharedState::new(Show::scene(9)));
    let session = open(&workspace, &live);

    assert_eq!(session.restore_latest(), RestoreResult::NoPriorState);
    assert_eq!(session.restore_latest_or_default(), Show::default());

    session.apply_latest_or_default();
    assert_eq!(live.get(), Show::default());
    assert!(session.list_restorable_slots().is_empty());
}

#[test]
fn test_older_schema_is_migrated_on_restore() {
    let workspace = TestWorkspace::new(BackendKind::Sqlite);
    // Written before `cues` existed.
    workspace
        .store()
        .append("state", &json!({"name": "legacy", "scene": 4, "master": 1}))
        .unwrap();

    let live = Arc::new(SharedState::new(Show::default()));
    let session = open(&workspace, &live);

    match session.restore_latest() {
        RestoreResult::Restored { state, seq, .. } => {
            assert_eq!(seq, 1);
            assert_eq!(state.name, "legacy");
            assert_eq!(state.scene, 4);
            assert!(state.cues.is_empty());
        }
        RestoreResult::NoPriorState => panic!("expected the legacy state to restore"),
    }
}

#[test]
fn test_invalid_latest_falls_back_to_default() {
    let workspace = TestWorkspace::new(BackendKind::Files);
    let store = workspace.store();
    store.append("state", &Show::scene(1)).unwrap();
    store.append("state", &json!(["not", "a", "show"])).unwrap();

    let live = Arc::new(SharedState::new(Show::scene(5)));
    let session = open(&workspace, &live);
    assert_eq!(session.restore_latest_or_default(), Show::default());
}

#[test]
fn test_slots_exclude_working_entries() {
    init_test_logging();
    for backend in [BackendKind::Sqlite, BackendKind::Files] {
        let workspace = TestWorkspace::new(backend).with_max_entries(4);
        let store = workspace.store();
        for n in 1..=6 {
            store.append("state", &Show::scene(n)).unwrap();
        }

        let live = Arc::new(SharedState::new(Show::default()));
        let session = open(&workspace, &live);
        let slots = session.list_restorable_slots();

        // Retained: 6, 5, 4, 3. The two newest are working entries.
        let seqs: Vec<u64> = slots.iter().map(|s| s.seq).collect();
        assert_eq!(seqs, vec![4, 3], "backend {}", backend.as_str());
        assert_eq!(store.load_all("state").len() - WORKING_ENTRIES, slots.len());
        assert!(slots.iter().all(|s| s.elapsed_label == "just now"));
    }
}

#[test]
fn test_slot_restore_replaces_live_state() {
    let workspace = TestWorkspace::new(BackendKind::Sqlite);
    let store = workspace.store();
    for n in 1..=4 {
        store.append("state", &Show::scene(n)).unwrap();
    }

    let live = Arc::new(SharedState::new(Show::scene(4)));
    let session = open(&workspace, &live);

    let oldest = session
        .list_restorable_slots()
        .into_iter()
        .last()
        .expect("at least one slot");
    assert_eq!(oldest.seq, 1);
    oldest.restore();

    assert_eq!(live.get(), Show::scene(1));
    // Restoring does not write to the log.
    assert_eq!(store.load_all("state").len(), 4);
}

#[tokio::test]
async fn test_capture_after_slot_restore_appends() {
    let workspace = TestWorkspace::new(BackendKind::Sqlite);
    let store = workspace.store();
    for n in 1..=3 {
        store.append("state", &Show::scene(n)).unwrap();
    }

    let live = Arc::new(SharedState::new(Show::scene(3)));
    let session = open(&workspace, &live);
    let slot = session.list_restorable_slots().remove(0);
    slot.restore();

    assert!(matches!(session.capture_now().await, CaptureOutcome::Persisted(_)));
    let newest: Show = serde_json::from_value(store.load_latest("state").unwrap().data).unwrap();
    assert_eq!(newest, Show::scene(1));
}
