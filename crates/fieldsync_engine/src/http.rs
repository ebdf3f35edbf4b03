//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted behind a trait so different
//! libraries (or a loopback into an in-process server) can provide the
//! wire layer. Bodies are JSON either way.

use crate::error::{EngineError, EngineResult};
use crate::transport::PushTransport;
use fieldsync_protocol::{PullSnapshot, PushRequest, PushResponse};
use parking_lot::RwLock;

/// Minimal HTTP client surface the transport needs.
///
/// Implementations own connection handling and must enforce a request
/// timeout; an elapsed timeout is reported as an `Err`, which the
/// transport surfaces as a retryable failure for the whole batch. A
/// non-2xx status is an `Err` as well; the engine never inspects
/// partial bodies of failed requests.
pub trait HttpClient: Send + Sync {
    /// Sends a POST with a JSON body, returning the response body.
    fn post_json(&self, url: &str, bearer: Option<&str>, body: &[u8]) -> Result<Vec<u8>, String>;

    /// Sends a GET, returning the response body.
    fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>, String>;
}

/// HTTP-based transport speaking the FieldSync JSON contract.
///
/// Push goes to `POST {base}/api/sync`, pull to
/// `GET {base}/api/sync/pull`. The bearer credential is opaque to the
/// engine; requests rejected for a missing or stale credential surface
/// as transport-level errors and retry like any other outage.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    client: C,
    token: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport against a server base URL.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            token: RwLock::new(None),
        }
    }

    /// Sets the bearer credential attached to every request.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Clears the bearer credential.
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// The server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> Option<String> {
        self.token.read().clone()
    }
}

impl<C: HttpClient> PushTransport for HttpTransport<C> {
    fn push(&self, request: &PushRequest) -> EngineResult<PushResponse> {
        let body = serde_json::to_vec(request)
            .map_err(|e| EngineError::Protocol(format!("failed to encode push request: {e}")))?;

        let url = format!("{}/api/sync", self.base_url);
        let response = self
            .client
            .post_json(&url, self.bearer().as_deref(), &body)
            .map_err(EngineError::transport_retryable)?;

        serde_json::from_slice(&response)
            .map_err(|e| EngineError::Protocol(format!("failed to decode push response: {e}")))
    }

    fn pull(&self) -> EngineResult<PullSnapshot> {
        let url = format!("{}/api/sync/pull", self.base_url);
        let response = self
            .client
            .get_json(&url, self.bearer().as_deref())
            .map_err(EngineError::transport_retryable)?;

        serde_json::from_slice(&response)
            .map_err(|e| EngineError::Protocol(format!("failed to decode pull snapshot: {e}")))
    }
}
