//! Snapshot storage for autosaved application state.
//!
//! A [`SnapshotStore`] keeps a bounded, newest-wins log of state snapshots per
//! logical key on top of a pluggable [`SnapshotBackend`].
//!
//! # Usage
//!
//! ```ignore
//! use autosave::snapshot::{SnapshotStore, SqliteBackend};
//!
//! let backend = Arc::new(SqliteBackend::open_default()?);
//! let store = SnapshotStore::new(backend, 10);
//!
//! store.append("state", &current_state)?;
//!
//! for snap in store.load_all("state") {
//!     println!("{}: {}", snap.seq, snap.elapsed_label(Utc::now()));
//! }
//! ```

mod backend;
mod db;
mod fs;
mod memory;
mod schema;
mod store;

pub use backend::SnapshotBackend;
pub use db::{default_db_path, SqliteBackend, DB_FILE_NAME};
pub use fs::FileBackend;
pub use memory::MemoryBackend;
pub use schema::{
    decode, digest, encode, format_elapsed, Snapshot, SnapshotSummary, ENVELOPE_FORMAT,
};
pub use store::{validate_key, SnapshotStore, MAX_KEY_LEN};
