//! Fixed-interval capture loop.
//!
//! Each tick pulls the live state, runs it through the [`EqualityGate`], and
//! appends it to the store when it changed. Ticks never overlap: the loop
//! awaits each capture before waiting for the next tick, and `capture_now`
//! shares the same lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::gate::EqualityGate;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::state::StateContainer;

/// Result of one capture cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// State changed and was appended.
    Persisted(Snapshot),
    /// State matched the last persisted one; nothing written.
    Unchanged,
    /// The cycle was abandoned; the next tick retries.
    Failed(String),
}

struct CaptureShared<C> {
    key: String,
    store: Arc<SnapshotStore>,
    container: Arc<C>,
    // Doubles as the capture lock. Empty until the first capture seeds it.
    gate: tokio::sync::Mutex<Option<EqualityGate>>,
}

impl<C: StateContainer> CaptureShared<C> {
    async fn newest_persisted(&self) -> Option<Value> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        match tokio::task::spawn_blocking(move || store.load_latest(&key)).await {
            Ok(latest) => latest.map(|snapshot| snapshot.data),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Gate seeding failed, starting empty");
                None
            }
        }
    }

    async fn capture(&self) -> CaptureOutcome {
        let mut gate = self.gate.lock().await;
        if gate.is_none() {
            *gate = Some(EqualityGate::seeded(self.newest_persisted().await));
        }
        let gate = gate.get_or_insert_with(EqualityGate::new);

        let value = match serde_json::to_value(self.container.current_state()) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %self.key, error = %e, "State not serializable, tick abandoned");
                return CaptureOutcome::Failed(e.to_string());
            }
        };

        if !gate.should_persist(&value) {
            debug!(key = %self.key, "State unchanged, capture skipped");
            return CaptureOutcome::Unchanged;
        }

        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let data = value.clone();
        match tokio::task::spawn_blocking(move || store.append_value(&key, data)).await {
            Ok(Ok(snapshot)) => {
                gate.record(value);
                CaptureOutcome::Persisted(snapshot)
            }
            Ok(Err(e)) => {
                warn!(key = %self.key, error = %e, "Snapshot write failed, tick abandoned");
                CaptureOutcome::Failed(e.to_string())
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Capture task failed, tick abandoned");
                CaptureOutcome::Failed(format!("task join: {e}"))
            }
        }
    }
}

struct CaptureSession {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Start/stop lifecycle around the periodic capture loop.
pub struct CaptureScheduler<C> {
    shared: Arc<CaptureShared<C>>,
    interval: Duration,
    session: Mutex<Option<CaptureSession>>,
}

impl<C: StateContainer> CaptureScheduler<C> {
    /// Builds a stopped scheduler without touching the store. The first
    /// capture seeds the gate from the newest snapshot already stored.
    pub fn new(
        key: impl Into<String>,
        interval: Duration,
        store: Arc<SnapshotStore>,
        container: Arc<C>,
    ) -> Self {
        Self {
            shared: Arc::new(CaptureShared {
                key: key.into(),
                store,
                container,
                gate: tokio::sync::Mutex::new(None),
            }),
            interval: interval.max(Duration::from_millis(1)),
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<CaptureSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts the timer. Idempotent while running.
    ///
    /// Returns false if no tokio runtime is available.
    pub fn start(&self) -> bool {
        let mut session = self.session();
        if session.as_ref().is_some_and(|s| !s.task.is_finished()) {
            debug!(key = %self.shared.key, "Capture scheduler already running");
            return true;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(key = %self.shared.key, "No async runtime, autosave not started");
            return false;
        };

        let (shutdown, rx) = watch::channel(false);
        let task = handle.spawn(run_loop(Arc::clone(&self.shared), self.interval, rx));
        *session = Some(CaptureSession { shutdown, task });

        info!(
            key = %self.shared.key,
            interval_secs = self.interval.as_secs(),
            "Capture scheduler started"
        );
        true
    }

    /// Stops future ticks. A tick already in progress completes.
    pub fn stop(&self) {
        if let Some(session) = self.session().take() {
            let _ = session.shutdown.send(true);
            info!(key = %self.shared.key, "Capture scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.session()
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    /// Runs one capture cycle immediately, serialized with the timer loop.
    pub async fn capture_now(&self) -> CaptureOutcome {
        self.shared.capture().await
    }
}

impl<C> Drop for CaptureScheduler<C> {
    fn drop(&mut self) {
        let session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            let _ = session.shutdown.send(true);
        }
    }
}

async fn run_loop<C: StateContainer>(
    shared: Arc<CaptureShared<C>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                debug!(key = %shared.key, "Capture loop shutting down");
                break;
            }
            _ = interval.tick() => {
                match shared.capture().await {
                    CaptureOutcome::Persisted(snapshot) => {
                        debug!(key = %shared.key, seq = snapshot.seq, "Periodic capture persisted");
                    }
                    CaptureOutcome::Unchanged => {}
                    CaptureOutcome::Failed(reason) => {
                        debug!(key = %shared.key, reason = %reason, "Periodic capture failed, retrying next tick");
                    }
                }
            }
        }
    }
}
