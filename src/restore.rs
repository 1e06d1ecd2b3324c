//! Startup restore and the save-slot view over the snapshot log.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::snapshot::{Snapshot, SnapshotStore};
use crate::state::{StateContainer, StateSchema};

/// The two newest entries are the live autosave trail, not save slots.
pub const WORKING_ENTRIES: usize = 2;

/// Outcome of loading the newest snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreResult<T> {
    /// A normalized state ready to apply.
    Restored {
        state: T,
        seq: u64,
        timestamp: DateTime<Utc>,
    },
    /// Nothing usable was persisted.
    NoPriorState,
}

impl<T> RestoreResult<T> {
    pub const fn is_restored(&self) -> bool {
        matches!(self, Self::Restored { .. })
    }

    pub fn into_state(self) -> Option<T> {
        match self {
            Self::Restored { state, .. } => Some(state),
            Self::NoPriorState => None,
        }
    }
}

/// A user-selectable historical snapshot.
pub struct SaveSlot {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    /// Time since saved, e.g. "5 minutes ago".
    pub elapsed_label: String,
    action: Box<dyn FnOnce() + Send>,
}

impl SaveSlot {
    /// Apply this slot's state to the live container.
    pub fn restore(self) {
        info!(seq = self.seq, "Restoring save slot");
        (self.action)();
    }
}

impl fmt::Debug for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveSlot")
            .field("seq", &self.seq)
            .field("timestamp", &self.timestamp)
            .field("elapsed_label", &self.elapsed_label)
            .finish_non_exhaustive()
    }
}

/// Reads snapshots back, normalizes them, and hands them to the container.
pub struct RestoreCoordinator<C, S> {
    store: Arc<SnapshotStore>,
    container: Arc<C>,
    schema: Arc<S>,
}

impl<C, S> RestoreCoordinator<C, S>
where
    C: StateContainer,
    S: StateSchema<State = C::State>,
{
    pub fn new(store: Arc<SnapshotStore>, container: Arc<C>, schema: Arc<S>) -> Self {
        Self {
            store,
            container,
            schema,
        }
    }

    fn normalize(&self, key: &str, snapshot: &Snapshot) -> Option<C::State> {
        match self.schema.normalize(snapshot.data.clone()) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(key, seq = snapshot.seq, error = %e, "Snapshot failed normalization");
                None
            }
        }
    }

    /// Newest snapshot, normalized, or an explicit `NoPriorState`.
    #[instrument(skip(self))]
    pub fn restore_latest(&self, key: &str) -> RestoreResult<C::State> {
        let Some(latest) = self.store.load_latest(key) else {
            debug!(key, "No prior state");
            return RestoreResult::NoPriorState;
        };

        match self.normalize(key, &latest) {
            Some(state) => {
                info!(key, seq = latest.seq, "Restored latest snapshot");
                RestoreResult::Restored {
                    state,
                    seq: latest.seq,
                    timestamp: latest.timestamp,
                }
            }
            None => RestoreResult::NoPriorState,
        }
    }

    /// Newest snapshot, normalized, else the default state.
    pub fn restore_latest_or_default(&self, key: &str) -> C::State {
        self.restore_latest(key)
            .into_state()
            .unwrap_or_else(|| self.schema.default_state())
    }

    /// Startup sequence: restore and push into the live container.
    pub fn apply_latest_or_default(&self, key: &str) {
        let state = self.restore_latest_or_default(key);
        self.container.replace_state(state);
    }

    /// Save slots, newest first, excluding the working entries.
    pub fn list_restorable_slots(&self, key: &str) -> Vec<SaveSlot> {
        self.list_restorable_slots_at(key, Utc::now())
    }

    /// Like [`Self::list_restorable_slots`] with a fixed "now" for labels.
    #[instrument(skip(self))]
    pub fn list_restorable_slots_at(&self, key: &str, now: DateTime<Utc>) -> Vec<SaveSlot> {
        let slots: Vec<SaveSlot> = self
            .store
            .load_all(key)
            .into_iter()
            .skip(WORKING_ENTRIES)
            .filter_map(|snapshot| {
                let state = self.normalize(key, &snapshot)?;
                let container = Arc::clone(&self.container);
                Some(SaveSlot {
                    seq: snapshot.seq,
                    timestamp: snapshot.timestamp,
                    elapsed_label: snapshot.elapsed_label(now),
                    action: Box::new(move || container.replace_state(state)),
                })
            })
            .collect();

        debug!(key, count = slots.len(), "Listed save slots");
        slots
    }
}
