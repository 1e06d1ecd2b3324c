//! Persistence backend abstraction.
//!
//! A backend stores opaque blobs addressed by `(key, seq)`. The snapshot
//! store owns encoding, ordering, and retention; backends only move bytes.

use crate::error::Result;

/// Named-blob storage over a durable medium.
///
/// # Implementation Notes
///
/// - `commit` must make the new blob durable before returning
/// - A reader must never observe a partially written blob
/// - A key that was never written lists as empty, not as an error
pub trait SnapshotBackend: Send + Sync {
    /// Short backend name for logs and listings.
    fn name(&self) -> &'static str;

    /// Sequence numbers stored under `key`, ascending.
    fn list(&self, key: &str) -> Result<Vec<u64>>;

    /// Raw bytes of one blob.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the blob does not exist, or
    /// `StorageRead` on I/O failure.
    fn read(&self, key: &str, seq: u64) -> Result<Vec<u8>>;

    /// Publishes a new blob, then removes the `evict` blobs.
    ///
    /// # Errors
    ///
    /// Returns `StorageWrite` if the new blob could not be made durable.
    /// In that case it must not become visible. Once it is visible the
    /// commit reports success, even if eviction fails afterwards.
    fn commit(&self, key: &str, seq: u64, bytes: &[u8], evict: &[u64]) -> Result<()>;

    /// Deletes one blob. Returns false if it did not exist.
    fn remove(&self, key: &str, seq: u64) -> Result<bool>;
}
