//! Push and pull request handlers.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::password;
use crate::store::RecordStore;
use crate::tables::{lookup, sanitize, TABLES};
use fieldsync_protocol::{ItemResult, PullSnapshot, PushItem, PushRequest, PushResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Applies client batches to the system of record and produces pull
/// snapshots.
///
/// Push handling is strictly per item: every submitted item yields
/// exactly one result, each item's upsert is its own atomic operation,
/// and one item's failure never rolls back or blocks its siblings.
pub struct SyncHandler<S: RecordStore> {
    store: Arc<S>,
    config: ServerConfig,
}

impl<S: RecordStore> SyncHandler<S> {
    /// Creates a handler over a shared store.
    pub fn new(config: ServerConfig, store: Arc<S>) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Applies a push batch in the order received.
    ///
    /// Items are correlated by their `clientRef` echo, never by row
    /// position. Submitting the same item twice (same global identifier,
    /// same data) yields the same row state both times: the second
    /// submission reports `ok`, not an error.
    pub fn handle_push(&self, request: &PushRequest) -> ServerResult<PushResponse> {
        if request.len() as u32 > self.config.max_push_batch {
            return Err(ServerError::InvalidRequest(format!(
                "batch too large: {} > {}",
                request.len(),
                self.config.max_push_batch
            )));
        }

        let results = request.items.iter().map(|item| self.apply_item(item)).collect();
        Ok(PushResponse::new(results))
    }

    fn apply_item(&self, item: &PushItem) -> ItemResult {
        let Some(table) = lookup(&item.table) else {
            debug!(table = %item.table, client_ref = item.client_ref, "ignoring unsupported table");
            return ItemResult::ignored(item.client_ref, &item.table, "unsupported table");
        };

        let mut data = sanitize(&item.data, table);

        if table.name == "users" {
            apply_password_policy(&mut data);
        }

        match self.store.upsert(table, data) {
            Ok(outcome) => ItemResult::ok(item.client_ref, table.name, outcome.id),
            Err(err) => {
                warn!(
                    table = table.name,
                    client_ref = item.client_ref,
                    error = %err,
                    "upsert failed"
                );
                ItemResult::error(item.client_ref, table.name, err.to_string())
            }
        }
    }

    /// Produces a full snapshot of every registered table.
    pub fn handle_pull(&self) -> PullSnapshot {
        let mut data = BTreeMap::new();
        for table in TABLES {
            data.insert(table.name.to_string(), self.store.rows(table.name));
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
            .to_string();
        PullSnapshot::new(timestamp, data)
    }
}

/// Ensures a user row never reaches the store with a plaintext (or
/// absent) password. Values already in stored-hash format pass through
/// untouched so re-synced rows keep their hashes stable.
fn apply_password_policy(data: &mut fieldsync_protocol::RowData) {
    let replacement = match data.get("password") {
        Some(Value::String(s)) if password::is_hashed(s) => None,
        Some(Value::String(s)) if !s.is_empty() => Some(password::hash_password(s)),
        _ => Some(password::hash_default_password()),
    };
    if let Some(hashed) = replacement {
        data.insert("password".into(), Value::String(hashed));
    }
}
