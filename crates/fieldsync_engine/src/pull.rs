//! Pull-merge: folding server snapshots into the local store.

use crate::error::EngineResult;
use crate::store::{EntityStore, MergeOutcome};
use fieldsync_protocol::{is_known_table, PullSnapshot};
use serde_json::Value;
use tracing::{debug, warn};

/// What one merge pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Rows created locally.
    pub inserted: usize,
    /// Rows updated in place.
    pub updated: usize,
    /// Rows skipped for lacking a global identifier.
    pub skipped_rows: usize,
    /// Snapshot tables outside the registry, skipped wholesale.
    pub skipped_tables: Vec<String>,
}

impl MergeReport {
    /// Total rows merged (inserted or updated).
    pub fn merged(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Merges a server snapshot into the local store, keyed by global
/// identifier: rows already known locally are updated in place, the
/// rest are inserted. Safe to invoke repeatedly: merging the same
/// snapshot twice never grows the local row count beyond the first
/// pass.
///
/// Known limitation: a pull racing a locally queued mutation for the
/// same identifier has no merge policy; the store serializes the
/// writers and the last one wins. The queued push re-asserts the local
/// value on its next successful cycle.
pub fn merge_snapshot<S: EntityStore>(
    store: &S,
    snapshot: &PullSnapshot,
) -> EngineResult<MergeReport> {
    let mut report = MergeReport::default();

    for (table, rows) in &snapshot.data {
        if !is_known_table(table) {
            warn!(table = %table, "skipping unknown table in snapshot");
            report.skipped_tables.push(table.clone());
            continue;
        }

        for row in rows {
            let uuid = match row.get("uuid") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                _ => {
                    report.skipped_rows += 1;
                    continue;
                }
            };

            match store.upsert_row(table, &uuid, row.clone())? {
                MergeOutcome::Inserted => report.inserted += 1,
                MergeOutcome::Updated => report.updated += 1,
            }
        }
    }

    debug!(
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped_rows,
        "merged pull snapshot"
    );
    Ok(report)
}
