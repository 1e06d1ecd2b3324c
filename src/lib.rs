//! Autosave engine - periodic state snapshots with bounded history.
//!
//! This library persists an application's full state on a fixed interval,
//! skips captures that change nothing, keeps a bounded FIFO history per
//! logical key, and restores the newest valid state (or an older save slot)
//! through host-supplied normalization.
//!
//! # Modules
//!
//! - `engine`: The `Autosave` facade owned by the host's lifecycle
//! - `snapshot`: Snapshot log and its storage backends
//! - `gate`: Equality gate that filters no-op captures
//! - `scheduler`: Fixed-interval capture loop
//! - `restore`: Startup restore and save slots
//! - `state`: Boundary traits for the host's state and schema
//! - `config`: Configuration file handling
//! - `error`: Error types with user-recoverable hints
//! - `cli` / `output`: The `autosave` inspection tool
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod logging;
pub mod output;
pub mod restore;
pub mod scheduler;
pub mod snapshot;
pub mod state;

pub use config::{AutosaveConfig, BackendKind};
pub use engine::Autosave;
pub use error::{AutosaveError, NormalizationError, Result};
pub use restore::{RestoreResult, SaveSlot, WORKING_ENTRIES};
pub use scheduler::CaptureOutcome;
pub use snapshot::{Snapshot, SnapshotStore};
pub use state::{JsonSchema, SharedState, StateContainer, StateSchema};
