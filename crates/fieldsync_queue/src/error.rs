//! Error types for the sync queue.

use crate::item::QueueStatus;
use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur in the sync queue.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Journal I/O failed.
    #[error("journal io error: {0}")]
    Io(#[from] std::io::Error),

    /// A queue item could not be serialized or deserialized.
    #[error("item codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The payload targets a table outside the registry allow-list.
    #[error("unsupported table: {0}")]
    UnsupportedTable(String),

    /// No item with the given id exists.
    #[error("queue item not found: {0}")]
    ItemNotFound(u64),

    /// The requested state transition is not allowed.
    #[error("invalid transition for item {id}: {from:?} -> {to}")]
    InvalidTransition {
        /// Item id.
        id: u64,
        /// Current status.
        from: QueueStatus,
        /// Attempted target.
        to: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = QueueError::UnsupportedTable("ghost".into());
        assert_eq!(err.to_string(), "unsupported table: ghost");

        let err = QueueError::InvalidTransition {
            id: 9,
            from: QueueStatus::Done,
            to: "Sending",
        };
        assert!(err.to_string().contains("9"));
        assert!(err.to_string().contains("Done"));
    }
}
