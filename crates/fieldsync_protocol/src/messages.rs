//! Push/pull wire messages.
//!
//! All messages serialize to JSON. Field names on the wire are camelCase
//! (`clientRef`), matching what the reconciliation server expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON object payload: the serialized field values of one entity row.
pub type RowData = serde_json::Map<String, serde_json::Value>;

/// One mutation inside a push request.
///
/// `client_ref` is an opaque correlation key chosen by the client and
/// echoed back verbatim in the matching [`ItemResult`]. The server must
/// never correlate by array position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushItem {
    /// Client-side correlation key, echoed back unchanged.
    pub client_ref: u64,
    /// Destination table name.
    pub table: String,
    /// Serialized entity snapshot (full field values, not a diff).
    pub data: RowData,
}

/// A batch of mutations sent in one sync cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushRequest {
    /// Items in dependency order; the server applies them in this order.
    pub items: Vec<PushItem>,
}

impl PushRequest {
    /// Creates a request from pre-ordered items.
    pub fn new(items: Vec<PushItem>) -> Self {
        Self { items }
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the batch carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-item outcome reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Upsert applied.
    Ok,
    /// Item skipped: the table is not in the server's allow-list.
    Ignored,
    /// Upsert attempted and failed.
    Error,
}

/// The acknowledgement for a single pushed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    /// Echo of [`PushItem::client_ref`].
    pub client_ref: u64,
    /// Echo of the table the item targeted.
    pub table: String,
    /// Outcome.
    pub status: ItemStatus,
    /// Server-local row id, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Error detail, present on `ignored` and `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    /// A successful upsert.
    pub fn ok(client_ref: u64, table: impl Into<String>, id: i64) -> Self {
        Self {
            client_ref,
            table: table.into(),
            status: ItemStatus::Ok,
            id: Some(id),
            error: None,
        }
    }

    /// A skipped item (table outside the allow-list).
    pub fn ignored(client_ref: u64, table: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            client_ref,
            table: table.into(),
            status: ItemStatus::Ignored,
            id: None,
            error: Some(error.into()),
        }
    }

    /// A failed upsert.
    pub fn error(client_ref: u64, table: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            client_ref,
            table: table.into(),
            status: ItemStatus::Error,
            id: None,
            error: Some(error.into()),
        }
    }

    /// Returns true if the item was applied.
    pub fn is_ok(&self) -> bool {
        self.status == ItemStatus::Ok
    }
}

/// The response to a push request: exactly one result per submitted item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushResponse {
    /// Per-item outcomes, correlated by `client_ref`.
    pub results: Vec<ItemResult>,
}

impl PushResponse {
    /// Creates a response from results.
    pub fn new(results: Vec<ItemResult>) -> Self {
        Self { results }
    }

    /// Finds the result for a given client reference.
    pub fn find(&self, client_ref: u64) -> Option<&ItemResult> {
        self.results.iter().find(|r| r.client_ref == client_ref)
    }
}

/// A server snapshot returned by the pull endpoint.
///
/// `data` maps table names to full row sets. Every row carries the
/// global `uuid` used as the merge key on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSnapshot {
    /// Whether the snapshot was produced successfully.
    pub ok: bool,
    /// Server-side snapshot timestamp (opaque string).
    pub timestamp: String,
    /// Rows per table.
    pub data: BTreeMap<String, Vec<RowData>>,
}

impl PullSnapshot {
    /// Creates a successful snapshot.
    pub fn new(timestamp: impl Into<String>, data: BTreeMap<String, Vec<RowData>>) -> Self {
        Self {
            ok: true,
            timestamp: timestamp.into(),
            data,
        }
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}
