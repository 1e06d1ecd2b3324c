//! The autosave engine facade.
//!
//! An [`Autosave`] is built once by the host's lifecycle controller and
//! passed to whoever needs it; there is no global instance. Its public
//! surface never returns storage errors: failures are logged and surface as
//! "no data" or [`CaptureOutcome::Failed`].

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::AutosaveConfig;
use crate::error::Result;
use crate::restore::{RestoreCoordinator, RestoreResult, SaveSlot};
use crate::scheduler::{CaptureOutcome, CaptureScheduler};
use crate::snapshot::SnapshotStore;
use crate::state::{StateContainer, StateSchema};

/// Periodic state snapshots with save-slot restore.
///
/// # Example
///
/// ```ignore
/// let live = Arc::new(SharedState::new(Show::default()));
/// let autosave = Autosave::open(config, Arc::clone(&live), JsonSchema::<Show>::new())?;
///
/// autosave.apply_latest_or_default();
/// autosave.start();
///
/// for slot in autosave.list_restorable_slots() {
///     println!("{}", slot.elapsed_label);
/// }
/// ```
pub struct Autosave<C, S> {
    config: AutosaveConfig,
    store: Arc<SnapshotStore>,
    scheduler: CaptureScheduler<C>,
    restore: RestoreCoordinator<C, S>,
}

impl<C, S> Autosave<C, S>
where
    C: StateContainer,
    S: StateSchema<State = C::State>,
{
    /// Validates `config` and opens its storage backend.
    #[instrument(skip_all, fields(key = %config.key))]
    pub fn open(config: AutosaveConfig, container: Arc<C>, schema: S) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(SnapshotStore::open(&config)?);
        info!(
            backend = store.backend_name(),
            max_entries = store.max_entries(),
            "Autosave engine ready"
        );
        Ok(Self::with_store(config, store, container, schema))
    }

    /// Builds an engine over an existing store.
    pub fn with_store(
        config: AutosaveConfig,
        store: Arc<SnapshotStore>,
        container: Arc<C>,
        schema: S,
    ) -> Self {
        let scheduler = CaptureScheduler::new(
            config.key.clone(),
            config.interval(),
            Arc::clone(&store),
            Arc::clone(&container),
        );
        let restore = RestoreCoordinator::new(Arc::clone(&store), container, Arc::new(schema));
        Self {
            config,
            store,
            scheduler,
            restore,
        }
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    pub fn key(&self) -> &str {
        &self.config.key
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Starts periodic capture. Idempotent.
    pub fn start(&self) -> bool {
        self.scheduler.start()
    }

    /// Stops periodic capture. Idempotent.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Captures immediately, outside the timer cadence.
    pub async fn capture_now(&self) -> CaptureOutcome {
        self.scheduler.capture_now().await
    }

    pub fn restore_latest(&self) -> RestoreResult<C::State> {
        self.restore.restore_latest(self.key())
    }

    pub fn restore_latest_or_default(&self) -> C::State {
        self.restore.restore_latest_or_default(self.key())
    }

    /// Startup restore: pushes the newest valid state, or the default, into
    /// the live container.
    pub fn apply_latest_or_default(&self) {
        self.restore.apply_latest_or_default(self.key());
    }

    pub fn list_restorable_slots(&self) -> Vec<SaveSlot> {
        self.restore.list_restorable_slots(self.key())
    }
}
