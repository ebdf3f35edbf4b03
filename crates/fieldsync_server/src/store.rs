//! The system of record behind the reconciliation handlers.
//!
//! The store is a trait so the reconciliation logic stays independent
//! of the storage engine. The in-memory implementation is the reference
//! one; a SQL-backed implementation plugs in at the same seam.

use crate::error::{ServerError, ServerResult};
use crate::tables::TableConfig;
use fieldsync_protocol::RowData;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Outcome of one upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Store-local row id (auto-increment).
    pub id: i64,
    /// True if a new row was created, false if an existing one was
    /// updated in place.
    pub inserted: bool,
}

/// A store that can apply idempotent upserts and produce snapshots.
///
/// # Invariants
///
/// - `upsert` is atomic per item: the row is either fully written with
///   all incoming columns or untouched
/// - a second upsert with the same natural key never creates a second
///   row and never fails because the row already exists
pub trait RecordStore: Send + Sync {
    /// Inserts the row, or updates all non-key columns of the row whose
    /// natural key matches. Returns the resulting row id.
    fn upsert(&self, table: &TableConfig, data: RowData) -> ServerResult<UpsertOutcome>;

    /// Full row set of a table, each row including its store-local `id`.
    fn rows(&self, table: &str) -> Vec<RowData>;

    /// Number of rows in a table.
    fn count(&self, table: &str) -> usize;
}

#[derive(Debug, Default)]
struct TableRows {
    next_id: i64,
    rows: Vec<(i64, RowData)>,
}

/// The in-memory system of record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, TableRows>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn key_value<'a>(data: &'a RowData, column: &str) -> Option<&'a str> {
    match data.get(column) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

impl RecordStore for MemoryStore {
    fn upsert(&self, table: &TableConfig, data: RowData) -> ServerResult<UpsertOutcome> {
        let key_column = table.conflict_key.column();
        let key = key_value(&data, key_column)
            .ok_or_else(|| ServerError::MissingKey {
                table: table.name.to_string(),
                column: key_column,
            })?
            .to_string();

        let mut tables = self.tables.write();
        let entry = tables.entry(table.name.to_string()).or_default();

        let existing = entry.rows.iter_mut().find(|(_, row)| {
            key_value(row, key_column)
                .map(|v| table.conflict_key.matches(v, &key))
                .unwrap_or(false)
        });

        match existing {
            Some((id, row)) => {
                // Update every non-key column from the incoming record.
                for (column, value) in data {
                    if column != key_column {
                        row.insert(column, value);
                    }
                }
                Ok(UpsertOutcome {
                    id: *id,
                    inserted: false,
                })
            }
            None => {
                entry.next_id += 1;
                let id = entry.next_id;
                entry.rows.push((id, data));
                Ok(UpsertOutcome { id, inserted: true })
            }
        }
    }

    fn rows(&self, table: &str) -> Vec<RowData> {
        let tables = self.tables.read();
        let Some(entry) = tables.get(table) else {
            return Vec::new();
        };
        entry
            .rows
            .iter()
            .map(|(id, row)| {
                let mut with_id = row.clone();
                with_id.insert("id".into(), Value::from(*id));
                with_id
            })
            .collect()
    }

    fn count(&self, table: &str) -> usize {
        self.tables
            .read()
            .get(table)
            .map(|entry| entry.rows.len())
            .unwrap_or(0)
    }
}
