//! Error types for the sync engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while driving sync cycles.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Network or transport failure. The whole batch is affected: no
    /// item may be assumed acknowledged.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether a later cycle may succeed.
        retryable: bool,
    },

    /// The response could not be decoded or violated the contract.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Queue operation failed.
    #[error("queue error: {0}")]
    Queue(#[from] fieldsync_queue::QueueError),

    /// Local entity store failed.
    #[error("store error: {0}")]
    Store(String),

    /// A sync cycle is already in flight; at most one may run at a
    /// time.
    #[error("a sync cycle is already in progress")]
    SyncInProgress,
}

impl EngineError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if a later cycle may succeed without operator
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Transport { retryable, .. } => *retryable,
            EngineError::SyncInProgress => true,
            _ => false,
        }
    }
}
