//! Error types for the reconciliation server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while reconciling client batches.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request as a whole is malformed (e.g. oversized batch).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller presented no credential, or an invalid one.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// An item lacks the natural key its table upserts on.
    #[error("missing conflict key {column} for table {table}")]
    MissingKey {
        /// Target table.
        table: String,
        /// The key column that was absent or empty.
        column: &'static str,
    },

    /// A unique constraint unrelated to the idempotent key was violated.
    #[error("constraint violation on {table}: {detail}")]
    Constraint {
        /// Target table.
        table: String,
        /// Violation detail.
        detail: String,
    },

    /// Internal store failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns true if the error is the caller's fault (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::NotAuthorized(_)
                | ServerError::MissingKey { .. }
                | ServerError::Constraint { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(ServerError::InvalidRequest("too many items".into()).is_client_error());
        assert!(ServerError::NotAuthorized("no token".into()).is_client_error());
        assert!(!ServerError::Internal("store poisoned".into()).is_client_error());
    }

    #[test]
    fn missing_key_display() {
        let err = ServerError::MissingKey {
            table: "users".into(),
            column: "email",
        };
        assert!(err.to_string().contains("email"));
        assert!(err.to_string().contains("users"));
    }
}
