//! Queue item model and state machine.

use fieldsync_protocol::{EntityKind, RowData};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Lifecycle state of a queue item.
///
/// ```text
/// Pending -> Sending -> { Done | Error }
/// Error   -> Sending            (retry)
/// Error   -> Conflict           (attempt ceiling reached)
/// Conflict -> Pending           (manual reset only)
/// ```
///
/// `Done` and `Conflict` are terminal: no automatic transition leaves
/// them. A `Sending` item found after a restart is demoted to `Error`,
/// never assumed complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueStatus {
    /// Awaiting a sync cycle.
    Pending,
    /// Handed to the transport; a response is outstanding.
    Sending,
    /// Acknowledged by the server; eligible for garbage collection.
    Done,
    /// Last transmission attempt failed; eligible for retry.
    Error,
    /// Failed past the attempt ceiling; requires operator action.
    Conflict,
}

impl QueueStatus {
    /// Returns true if no automatic transition leaves this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Done | QueueStatus::Conflict)
    }

    /// Returns true if the scheduler may pick this item for a batch.
    pub fn is_eligible(&self) -> bool {
        matches!(self, QueueStatus::Pending | QueueStatus::Error)
    }
}

/// A single queued mutation.
///
/// The payload is a full snapshot of the entity's serialized field
/// values at enqueue time, not a diff. The item is correlated with its
/// server acknowledgement through `id`, which the transport sends as the
/// wire `clientRef`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Locally unique id, assigned on enqueue, immutable.
    pub id: u64,
    /// Entity kind of the mutation.
    pub kind: EntityKind,
    /// Destination table (usually `kind.table()`, but independent).
    pub table: String,
    /// Serialized entity snapshot.
    pub payload: RowData,
    /// Priority, lower is more urgent.
    pub priority: u8,
    /// Transmission attempts so far; only ever increases, except through
    /// an explicit operator reset.
    pub attempts: u32,
    /// Current lifecycle state.
    pub status: QueueStatus,
    /// Human-readable detail of the last failure; cleared on success.
    pub last_error: Option<String>,
    /// Creation time, Unix milliseconds.
    pub created_at: u64,
    /// Last mutation time, Unix milliseconds.
    pub updated_at: u64,
}

impl QueueItem {
    /// Creates a fresh `Pending` item.
    pub fn new(id: u64, kind: EntityKind, table: impl Into<String>, payload: RowData, priority: u8) -> Self {
        let now = now_millis();
        Self {
            id,
            kind,
            table: table.into(),
            payload,
            priority,
            attempts: 0,
            status: QueueStatus::Pending,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The global identifier carried in the payload, if present.
    pub fn payload_uuid(&self) -> Option<&str> {
        self.payload.get("uuid").and_then(|v| v.as_str())
    }

    /// Stamps `updated_at` with the current time.
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
