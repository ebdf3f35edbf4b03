//! Local entity store interface.
//!
//! The engine does not own the device's entity tables; it reaches them
//! through this seam. Pull-merge upserts server rows through it, keyed
//! by global identifier. Writers (local mutation handlers and
//! pull-merge) are serialized by the store implementation; this crate
//! defines no merge policy for concurrent writes to the same row, the
//! last writer wins.

use crate::error::{EngineError, EngineResult};
use fieldsync_protocol::RowData;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// How a merged row landed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No row with that identifier existed; a new one was created.
    Inserted,
    /// An existing row was updated in place, keeping its local id.
    Updated,
}

/// The device-local entity store.
pub trait EntityStore: Send + Sync {
    /// Inserts or updates one row by its global identifier.
    ///
    /// Never creates a second row for an identifier that already exists
    /// locally under a different local numeric id.
    fn upsert_row(&self, table: &str, uuid: &str, row: RowData) -> EngineResult<MergeOutcome>;

    /// Full local row set of a table.
    fn rows(&self, table: &str) -> Vec<RowData>;

    /// Number of local rows in a table.
    fn count(&self, table: &str) -> usize;
}

#[derive(Debug, Default)]
struct TableRows {
    next_local_id: i64,
    rows: Vec<(i64, RowData)>,
}

/// An in-memory entity store (tests and ephemeral sessions).
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    tables: RwLock<HashMap<String, TableRows>>,
}

impl MemoryEntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks a row up by global identifier.
    pub fn row_by_uuid(&self, table: &str, uuid: &str) -> Option<RowData> {
        let tables = self.tables.read();
        tables.get(table)?.rows.iter().find_map(|(_, row)| {
            (row_uuid(row) == Some(uuid)).then(|| row.clone())
        })
    }
}

fn row_uuid(row: &RowData) -> Option<&str> {
    match row.get("uuid") {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

impl EntityStore for MemoryEntityStore {
    fn upsert_row(&self, table: &str, uuid: &str, row: RowData) -> EngineResult<MergeOutcome> {
        if uuid.is_empty() {
            return Err(EngineError::Store("empty identifier".into()));
        }

        let mut tables = self.tables.write();
        let entry = tables.entry(table.to_string()).or_default();

        if let Some((local_id, existing)) = entry
            .rows
            .iter_mut()
            .find(|(_, r)| row_uuid(r) == Some(uuid))
        {
            let keep_id = *local_id;
            *existing = row;
            existing.insert("local_id".into(), Value::from(keep_id));
            Ok(MergeOutcome::Updated)
        } else {
            entry.next_local_id += 1;
            let local_id = entry.next_local_id;
            let mut row = row;
            row.insert("local_id".into(), Value::from(local_id));
            entry.rows.push((local_id, row));
            Ok(MergeOutcome::Inserted)
        }
    }

    fn rows(&self, table: &str) -> Vec<RowData> {
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|entry| entry.rows.iter().map(|(_, row)| row.clone()).collect())
            .unwrap_or_default()
    }

    fn count(&self, table: &str) -> usize {
        self.tables
            .read()
            .get(table)
            .map(|entry| entry.rows.len())
            .unwrap_or(0)
    }
}
