//! Snapshot data types and the on-medium entry envelope.
//!
//! Each persisted entry is a JSON envelope carrying the sequence number,
//! the capture time, a SHA-256 digest of the state, and the state itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{AutosaveError, Result};

/// Current envelope format version.
pub const ENVELOPE_FORMAT: u32 = 1;

/// One immutable, timestamped copy of application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Per-key sequence number, strictly increasing.
    pub seq: u64,
    /// When the state was captured.
    pub timestamp: DateTime<Utc>,
    /// The captured state.
    pub data: Value,
}

impl Snapshot {
    /// Human-readable time since this snapshot was taken.
    #[must_use]
    pub fn elapsed_label(&self, now: DateTime<Utc>) -> String {
        format_elapsed(self.timestamp, now)
    }

    /// Summary row for listings.
    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> SnapshotSummary {
        SnapshotSummary {
            seq: self.seq,
            timestamp: self.timestamp,
            elapsed: self.elapsed_label(now),
        }
    }
}

/// Listing row for a snapshot, without its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub elapsed: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: u32,
    seq: u64,
    timestamp: DateTime<Utc>,
    digest: String,
    data: Value,
}

/// Hex SHA-256 of the canonical JSON encoding of `data`.
///
/// `serde_json::Map` keeps keys sorted, so equal values always hash equal.
pub fn digest(data: &Value) -> String {
    let canonical = serde_json::to_vec(data).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

/// Encodes a snapshot into its envelope bytes.
pub fn encode(key: &str, snapshot: &Snapshot) -> Result<Vec<u8>> {
    let envelope = Envelope {
        format: ENVELOPE_FORMAT,
        seq: snapshot.seq,
        timestamp: snapshot.timestamp,
        digest: digest(&snapshot.data),
        data: snapshot.data.clone(),
    };
    serde_json::to_vec(&envelope).map_err(|e| AutosaveError::StorageWrite {
        key: key.to_string(),
        reason: format!("Failed to encode snapshot: {e}"),
    })
}

/// Decodes envelope bytes stored at `(key, seq)`.
///
/// Fails with [`AutosaveError::EntryDecode`] when the bytes are not an
/// envelope, the format is unknown, the digest does not match, or the
/// embedded sequence number disagrees with the storage address.
pub fn decode(key: &str, seq: u64, bytes: &[u8]) -> Result<Snapshot> {
    let fail = |reason: String| AutosaveError::EntryDecode {
        key: key.to_string(),
        seq,
        reason,
    };

    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| fail(format!("invalid envelope: {e}")))?;

    if envelope.format != ENVELOPE_FORMAT {
        return Err(fail(format!("unsupported format {}", envelope.format)));
    }
    if envelope.seq != seq {
        return Err(fail(format!("stored under {seq} but claims {}", envelope.seq)));
    }
    if digest(&envelope.data) != envelope.digest {
        return Err(fail("digest mismatch".to_string()));
    }

    Ok(Snapshot {
        seq: envelope.seq,
        timestamp: envelope.timestamp,
        data: envelope.data,
    })
}

/// Formats the time between `since` and `now` using its largest whole unit.
pub fn format_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }

    let (count, unit) = if secs < 3_600 {
        (secs / 60, "minute")
    } else if secs < 86_400 {
        (secs / 3_600, "hour")
    } else {
        (secs / 86_400, "day")
    };

    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
