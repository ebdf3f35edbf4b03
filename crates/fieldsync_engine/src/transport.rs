//! Transport abstraction for push and pull.

use crate::error::{EngineError, EngineResult};
use fieldsync_protocol::{PullSnapshot, PushRequest, PushResponse};
use parking_lot::Mutex;

/// Network seam between the engine and the reconciliation server.
///
/// Implementations must bound how long a call may block; a request
/// with no response within the bound fails with a retryable transport
/// error rather than hanging the cycle.
pub trait PushTransport: Send + Sync {
    /// Sends one batch and returns the per-item acknowledgements.
    ///
    /// An `Err` means nothing was acknowledged: HTTP-level failure
    /// never implies partial success.
    fn push(&self, request: &PushRequest) -> EngineResult<PushResponse>;

    /// Fetches the current server snapshot.
    fn pull(&self) -> EngineResult<PullSnapshot>;
}

enum MockOutcome<T> {
    Respond(T),
    Fail { message: String, retryable: bool },
}

/// A scripted transport for tests.
#[derive(Default)]
pub struct MockTransport {
    push_outcome: Mutex<Option<MockOutcome<PushResponse>>>,
    pull_outcome: Mutex<Option<MockOutcome<PullSnapshot>>>,
    push_requests: Mutex<Vec<PushRequest>>,
}

impl MockTransport {
    /// Creates a transport with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the push response (returned on every push).
    pub fn set_push_response(&self, response: PushResponse) {
        *self.push_outcome.lock() = Some(MockOutcome::Respond(response));
    }

    /// Scripts push to fail with a transport error.
    pub fn set_push_error(&self, message: impl Into<String>, retryable: bool) {
        *self.push_outcome.lock() = Some(MockOutcome::Fail {
            message: message.into(),
            retryable,
        });
    }

    /// Scripts the pull snapshot.
    pub fn set_pull_response(&self, snapshot: PullSnapshot) {
        *self.pull_outcome.lock() = Some(MockOutcome::Respond(snapshot));
    }

    /// Scripts pull to fail with a transport error.
    pub fn set_pull_error(&self, message: impl Into<String>, retryable: bool) {
        *self.pull_outcome.lock() = Some(MockOutcome::Fail {
            message: message.into(),
            retryable,
        });
    }

    /// Every push request seen so far, in order.
    pub fn push_requests(&self) -> Vec<PushRequest> {
        self.push_requests.lock().clone()
    }
}

impl PushTransport for MockTransport {
    fn push(&self, request: &PushRequest) -> EngineResult<PushResponse> {
        self.push_requests.lock().push(request.clone());
        match &*self.push_outcome.lock() {
            Some(MockOutcome::Respond(response)) => Ok(response.clone()),
            Some(MockOutcome::Fail { message, retryable }) => Err(EngineError::Transport {
                message: message.clone(),
                retryable: *retryable,
            }),
            None => Err(EngineError::Protocol("no mock push outcome set".into())),
        }
    }

    fn pull(&self) -> EngineResult<PullSnapshot> {
        match &*self.pull_outcome.lock() {
            Some(MockOutcome::Respond(snapshot)) => Ok(snapshot.clone()),
            Some(MockOutcome::Fail { message, retryable }) => Err(EngineError::Transport {
                message: message.clone(),
                retryable: *retryable,
            }),
            None => Err(EngineError::Protocol("no mock pull outcome set".into())),
        }
    }
}
