//! The reconciliation server facade.

use crate::auth::{AuthConfig, TokenValidator};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::SyncHandler;
use crate::store::{MemoryStore, RecordStore};
use fieldsync_protocol::{PullSnapshot, PushRequest, PushResponse};
use std::sync::Arc;

/// The FieldSync reconciliation server.
///
/// Bundles the push/pull handlers with bearer-token authentication. An
/// HTTP layer in front of this maps `POST /api/sync` to
/// [`SyncServer::handle_push`] and `GET /api/sync/pull` to
/// [`SyncServer::handle_pull`], passing the `Authorization: Bearer`
/// value through as the token.
///
/// # Example
///
/// ```
/// use fieldsync_server::{ServerConfig, SyncServer};
/// use fieldsync_protocol::PushRequest;
///
/// let server = SyncServer::new(ServerConfig::default());
/// let response = server.handle_push(None, &PushRequest::default()).unwrap();
/// assert!(response.results.is_empty());
/// ```
pub struct SyncServer<S: RecordStore = MemoryStore> {
    handler: SyncHandler<S>,
    validator: Option<TokenValidator>,
}

impl SyncServer<MemoryStore> {
    /// Creates a server over a fresh in-memory store.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }
}

impl<S: RecordStore> SyncServer<S> {
    /// Creates a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<S>) -> Self {
        let validator = config.auth_secret.clone().map(|secret| {
            TokenValidator::new(AuthConfig::new(secret).with_expiry(config.token_expiry))
        });
        Self {
            handler: SyncHandler::new(config, store),
            validator,
        }
    }

    /// Issues a bearer token for a subject.
    ///
    /// Returns `None` when authentication is disabled.
    pub fn issue_token(&self, subject: &str) -> Option<String> {
        self.validator.as_ref().map(|v| v.issue_token(subject))
    }

    /// Handles a push request.
    pub fn handle_push(
        &self,
        token: Option<&str>,
        request: &PushRequest,
    ) -> ServerResult<PushResponse> {
        self.authorize(token)?;
        self.handler.handle_push(request)
    }

    /// Handles a pull request.
    pub fn handle_pull(&self, token: Option<&str>) -> ServerResult<PullSnapshot> {
        self.authorize(token)?;
        Ok(self.handler.handle_pull())
    }

    /// Number of rows currently stored for a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.handler.store().count(table)
    }

    fn authorize(&self, token: Option<&str>) -> ServerResult<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        let token = token.ok_or_else(|| ServerError::NotAuthorized("missing token".into()))?;
        validator.validate_token(token).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_protocol::{PushItem, RowData};
    use serde_json::json;

    fn mother_item(client_ref: u64, uuid: &str) -> PushItem {
        let mut data = RowData::new();
        data.insert("uuid".into(), json!(uuid));
        PushItem {
            client_ref,
            table: "mothers".into(),
            data,
        }
    }

    #[test]
    fn open_server_accepts_requests_without_token() {
        let server = SyncServer::new(ServerConfig::default());
        let response = server
            .handle_push(None, &PushRequest::new(vec![mother_item(1, "m-1")]))
            .unwrap();
        assert!(response.find(1).unwrap().is_ok());
        assert_eq!(server.row_count("mothers"), 1);
    }

    #[test]
    fn authenticated_server_rejects_missing_token() {
        let server =
            SyncServer::new(ServerConfig::default().with_auth_secret(b"secret".to_vec()));

        let err = server
            .handle_push(None, &PushRequest::new(vec![mother_item(1, "m-1")]))
            .unwrap_err();
        assert!(matches!(err, ServerError::NotAuthorized(_)));
        assert!(matches!(
            server.handle_pull(Some("bogus")).unwrap_err(),
            ServerError::NotAuthorized(_)
        ));
    }

    #[test]
    fn authenticated_flow() {
        let server =
            SyncServer::new(ServerConfig::default().with_auth_secret(b"secret".to_vec()));
        let token = server.issue_token("op@example.com").unwrap();

        let response = server
            .handle_push(
                Some(&token),
                &PushRequest::new(vec![mother_item(1, "m-1")]),
            )
            .unwrap();
        assert!(response.find(1).unwrap().is_ok());

        let snapshot = server.handle_pull(Some(&token)).unwrap();
        assert_eq!(snapshot.data["mothers"].len(), 1);
    }

    #[test]
    fn shared_store_is_visible_across_facades() {
        let store = Arc::new(MemoryStore::new());
        let server = SyncServer::with_store(ServerConfig::default(), Arc::clone(&store));

        server
            .handle_push(None, &PushRequest::new(vec![mother_item(1, "m-1")]))
            .unwrap();
        assert_eq!(store.count("mothers"), 1);
    }
}
