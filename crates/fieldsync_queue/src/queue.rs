//! The durable sync queue.

use crate::error::{QueueError, QueueResult};
use crate::item::{QueueItem, QueueStatus};
use crate::journal::{FileStore, Journal, JournalRecord, JournalStore, MemoryStore};
use crate::scheduler::sort_batch;
use fieldsync_protocol::{is_known_table, EntityKind, RowData, DEFAULT_PASSWORD};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Observable per-status item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    /// Items awaiting their first cycle.
    pub pending: usize,
    /// Items with a response outstanding.
    pub sending: usize,
    /// Acknowledged items not yet collected.
    pub done: usize,
    /// Items eligible for retry.
    pub error: usize,
    /// Items requiring operator action.
    pub conflict: usize,
}

impl QueueCounts {
    /// Total number of items.
    pub fn total(&self) -> usize {
        self.pending + self.sending + self.done + self.error + self.conflict
    }
}

/// A durable, ordered log of pending mutations.
///
/// The queue keeps its working state in memory and journals every
/// mutation, so a restart rebuilds exactly the persisted state. It is
/// independent of the entity tables it references: payloads are
/// self-contained snapshots.
///
/// The queue has a single writer (the sync engine's scheduler/transport
/// pair); reads are lock-free snapshots for observability.
pub struct SyncQueue {
    journal: Journal,
    items: RwLock<BTreeMap<u64, QueueItem>>,
    next_id: AtomicU64,
}

impl SyncQueue {
    /// Opens a queue over an arbitrary journal store, replaying any
    /// persisted state.
    ///
    /// Recovery rules:
    /// - an unreadable journal tail (torn write) is truncated away
    /// - an item recovered in `Sending` is demoted to `Error`: the send
    ///   outcome is unknown, and it must never be assumed complete
    pub fn open(store: Box<dyn JournalStore>, sync_on_write: bool) -> QueueResult<Self> {
        let journal = Journal::new(store, sync_on_write);
        let replay = journal.replay()?;

        if replay.torn_tail {
            warn!(valid_len = replay.valid_len, "discarding torn journal tail");
            journal.truncate(replay.valid_len)?;
        }

        let mut max_id = 0u64;
        let mut items: BTreeMap<u64, QueueItem> = BTreeMap::new();
        for record in replay.records {
            match record {
                JournalRecord::Upsert(item) => {
                    max_id = max_id.max(item.id);
                    items.insert(item.id, *item);
                }
                JournalRecord::Remove(id) => {
                    max_id = max_id.max(id);
                    items.remove(&id);
                }
            }
        }

        let mut demoted = Vec::new();
        for item in items.values_mut() {
            if item.status == QueueStatus::Sending {
                item.status = QueueStatus::Error;
                item.last_error = Some("interrupted: send outcome unknown after restart".into());
                item.touch();
                demoted.push(item.clone());
            }
        }
        for item in demoted {
            warn!(id = item.id, "recovered in-flight item as retryable");
            journal.append(&JournalRecord::Upsert(Box::new(item)))?;
        }

        Ok(Self {
            journal,
            items: RwLock::new(items),
            next_id: AtomicU64::new(max_id + 1),
        })
    }

    /// Opens a file-backed queue at `path`, with every write flushed to
    /// disk before it is reported durable.
    pub fn open_file(path: &Path) -> QueueResult<Self> {
        Self::open(Box::new(FileStore::open(path)?), true)
    }

    /// Creates an empty in-memory queue (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self {
            journal: Journal::new(Box::new(MemoryStore::new()), false),
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends a new `Pending` item and returns its id.
    ///
    /// The destination table must be in the registry allow-list; unknown
    /// tables are rejected, never silently dropped. A payload without a
    /// global identifier gets a fresh v4 UUID; server-side idempotency
    /// depends on the identifier existing before the first transmission.
    /// A `users` payload without a password receives the default one, so
    /// the server never sees a password-less account.
    pub fn enqueue(
        &self,
        kind: EntityKind,
        table: &str,
        mut payload: RowData,
        priority: Option<u8>,
    ) -> QueueResult<u64> {
        if !is_known_table(table) {
            return Err(QueueError::UnsupportedTable(table.to_string()));
        }

        let missing_uuid = !matches!(payload.get("uuid"), Some(Value::String(s)) if !s.is_empty());
        if missing_uuid {
            payload.insert(
                "uuid".into(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }

        if table == "users" {
            let missing_password =
                !matches!(payload.get("password"), Some(Value::String(s)) if !s.is_empty());
            if missing_password {
                payload.insert("password".into(), Value::String(DEFAULT_PASSWORD.into()));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let priority = priority.unwrap_or_else(|| kind.default_priority());
        let item = QueueItem::new(id, kind, table, payload, priority);

        let mut items = self.items.write();
        self.journal
            .append(&JournalRecord::Upsert(Box::new(item.clone())))?;
        items.insert(id, item);
        debug!(id, kind = ?kind, table, "enqueued");
        Ok(id)
    }

    /// Returns all `Pending` and `Error` items in transmission order.
    ///
    /// The order is the composite (dependency rank, priority, creation
    /// time, id) key; see the scheduler module. The scheduler does not
    /// pre-validate that parents synced successfully, it only
    /// guarantees dependency *order*; a child whose parent failed in the
    /// same batch is still attempted and the server reports the
    /// foreign-key failure.
    pub fn select_batch(&self) -> Vec<QueueItem> {
        let items = self.items.read();
        let mut batch: Vec<QueueItem> = items
            .values()
            .filter(|i| i.status.is_eligible())
            .cloned()
            .collect();
        drop(items);

        sort_batch(&mut batch);
        batch
    }

    /// Marks a batch as in flight. Every id must refer to an eligible
    /// item; the call mutates nothing if any id fails validation.
    ///
    /// The transmission attempt is counted here, regardless of outcome.
    pub fn mark_sending(&self, ids: &[u64]) -> QueueResult<()> {
        let mut items = self.items.write();

        for &id in ids {
            let item = items.get(&id).ok_or(QueueError::ItemNotFound(id))?;
            if !item.status.is_eligible() {
                return Err(QueueError::InvalidTransition {
                    id,
                    from: item.status,
                    to: "Sending",
                });
            }
        }

        for &id in ids {
            let mut updated = items[&id].clone();
            updated.status = QueueStatus::Sending;
            updated.attempts += 1;
            updated.touch();
            self.journal
                .append(&JournalRecord::Upsert(Box::new(updated.clone())))?;
            items.insert(id, updated);
        }
        Ok(())
    }

    /// Records a server acknowledgement for an in-flight item.
    pub fn mark_done(&self, id: u64) -> QueueResult<()> {
        let mut items = self.items.write();
        let item = items.get(&id).ok_or(QueueError::ItemNotFound(id))?;
        if item.status != QueueStatus::Sending {
            return Err(QueueError::InvalidTransition {
                id,
                from: item.status,
                to: "Done",
            });
        }

        let mut updated = item.clone();
        updated.status = QueueStatus::Done;
        updated.last_error = None;
        updated.touch();
        self.journal
            .append(&JournalRecord::Upsert(Box::new(updated.clone())))?;
        items.insert(id, updated);
        Ok(())
    }

    /// Records a failed transmission attempt for an in-flight item.
    ///
    /// Escalates to `Conflict` once `attempts` reaches `ceiling`
    /// (a ceiling of 0 disables escalation). Returns the resulting
    /// status.
    pub fn mark_failed(&self, id: u64, error: &str, ceiling: u32) -> QueueResult<QueueStatus> {
        let mut items = self.items.write();
        let item = items.get(&id).ok_or(QueueError::ItemNotFound(id))?;
        if item.status != QueueStatus::Sending {
            return Err(QueueError::InvalidTransition {
                id,
                from: item.status,
                to: "Error",
            });
        }

        let mut updated = item.clone();
        updated.status = if ceiling > 0 && updated.attempts >= ceiling {
            QueueStatus::Conflict
        } else {
            QueueStatus::Error
        };
        updated.last_error = Some(error.to_string());
        updated.touch();

        let status = updated.status;
        if status == QueueStatus::Conflict {
            warn!(id, attempts = updated.attempts, "item escalated to conflict");
        }

        self.journal
            .append(&JournalRecord::Upsert(Box::new(updated.clone())))?;
        items.insert(id, updated);
        Ok(status)
    }

    /// Operator reset: returns a `Conflict` or `Error` item to `Pending`
    /// and zeroes its attempt counter.
    pub fn reset(&self, id: u64) -> QueueResult<()> {
        let mut items = self.items.write();
        let item = items.get(&id).ok_or(QueueError::ItemNotFound(id))?;
        if !matches!(item.status, QueueStatus::Conflict | QueueStatus::Error) {
            return Err(QueueError::InvalidTransition {
                id,
                from: item.status,
                to: "Pending",
            });
        }

        let mut updated = item.clone();
        updated.status = QueueStatus::Pending;
        updated.attempts = 0;
        updated.last_error = None;
        updated.touch();
        self.journal
            .append(&JournalRecord::Upsert(Box::new(updated.clone())))?;
        items.insert(id, updated);
        Ok(())
    }

    /// Zeroes the attempt counter of every `Error` item.
    ///
    /// Used when the engine is configured to give manually retried items
    /// a full attempt budget again. Returns the number of items touched.
    pub fn clear_error_attempts(&self) -> QueueResult<usize> {
        let mut items = self.items.write();
        let ids: Vec<u64> = items
            .values()
            .filter(|i| i.status == QueueStatus::Error && i.attempts > 0)
            .map(|i| i.id)
            .collect();

        for &id in &ids {
            let mut updated = items[&id].clone();
            updated.attempts = 0;
            updated.touch();
            self.journal
                .append(&JournalRecord::Upsert(Box::new(updated.clone())))?;
            items.insert(id, updated);
        }
        Ok(ids.len())
    }

    /// Operator discard: removes one item from the queue without
    /// touching the entity row it snapshots. In-flight items cannot be
    /// discarded.
    pub fn discard(&self, id: u64) -> QueueResult<QueueItem> {
        let mut items = self.items.write();
        let item = items.get(&id).ok_or(QueueError::ItemNotFound(id))?;
        if item.status == QueueStatus::Sending {
            return Err(QueueError::InvalidTransition {
                id,
                from: item.status,
                to: "discarded",
            });
        }

        self.journal.append(&JournalRecord::Remove(id))?;
        items.remove(&id).ok_or(QueueError::ItemNotFound(id))
    }

    /// Deletes every acknowledged (`Done`) item and compacts the
    /// journal. Returns the number of items collected.
    pub fn collect_garbage(&self) -> QueueResult<usize> {
        let mut items = self.items.write();
        let ids: Vec<u64> = items
            .values()
            .filter(|i| i.status == QueueStatus::Done)
            .map(|i| i.id)
            .collect();

        for &id in &ids {
            self.journal.append(&JournalRecord::Remove(id))?;
            items.remove(&id);
        }

        if !ids.is_empty() {
            let live: Vec<JournalRecord> = items
                .values()
                .map(|i| JournalRecord::Upsert(Box::new(i.clone())))
                .collect();
            self.journal.rewrite(live.iter())?;
            debug!(collected = ids.len(), "garbage collected queue");
        }
        Ok(ids.len())
    }

    /// Rewrites the journal down to one record per live item.
    pub fn compact(&self) -> QueueResult<()> {
        let items = self.items.write();
        let live: Vec<JournalRecord> = items
            .values()
            .map(|i| JournalRecord::Upsert(Box::new(i.clone())))
            .collect();
        self.journal.rewrite(live.iter())
    }

    /// Looks one item up by id.
    pub fn get(&self, id: u64) -> Option<QueueItem> {
        self.items.read().get(&id).cloned()
    }

    /// Snapshot of all items, ordered by id.
    pub fn items(&self) -> Vec<QueueItem> {
        self.items.read().values().cloned().collect()
    }

    /// Per-status counts.
    pub fn counts(&self) -> QueueCounts {
        let items = self.items.read();
        let mut counts = QueueCounts::default();
        for item in items.values() {
            match item.status {
                QueueStatus::Pending => counts.pending += 1,
                QueueStatus::Sending => counts.sending += 1,
                QueueStatus::Done => counts.done += 1,
                QueueStatus::Error => counts.error += 1,
                QueueStatus::Conflict => counts.conflict += 1,
            }
        }
        counts
    }

    /// Number of items currently in the queue.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl std::fmt::Debug for SyncQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncQueue")
            .field("counts", &self.counts())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(uuid: &str) -> RowData {
        let mut map = RowData::new();
        map.insert("uuid".into(), json!(uuid));
        map
    }

    #[test]
    fn enqueue_assigns_ids_and_defaults() {
        let queue = SyncQueue::in_memory();

        let id1 = queue
            .enqueue(EntityKind::Mother, "mothers", payload("m-1"), None)
            .unwrap();
        let id2 = queue
            .enqueue(EntityKind::Baby, "babies", payload("b-1"), Some(1))
            .unwrap();

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(queue.get(id1).unwrap().priority, 2);
        assert_eq!(queue.get(id2).unwrap().priority, 1);
    }

    #[test]
    fn enqueue_rejects_unknown_table() {
        let queue = SyncQueue::in_memory();
        let err = queue
            .enqueue(EntityKind::Mother, "ghost_table", RowData::new(), None)
            .unwrap_err();
        assert!(matches!(err, QueueError::UnsupportedTable(t) if t == "ghost_table"));
        assert!(queue.is_empty());
    }

    #[test]
    fn enqueue_assigns_uuid_when_missing() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::Scanner, "scanners", RowData::new(), None)
            .unwrap();

        let uuid = queue.get(id).unwrap().payload_uuid().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&uuid).is_ok());

        // An existing identifier is never replaced.
        let id2 = queue
            .enqueue(EntityKind::Scanner, "scanners", payload("keep-me"), None)
            .unwrap();
        assert_eq!(queue.get(id2).unwrap().payload_uuid(), Some("keep-me"));
    }

    #[test]
    fn enqueue_defaults_user_password() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::User, "users", payload("u-1"), None)
            .unwrap();

        let item = queue.get(id).unwrap();
        assert_eq!(
            item.payload.get("password").and_then(|v| v.as_str()),
            Some(DEFAULT_PASSWORD)
        );

        // Non-user tables are untouched.
        let id2 = queue
            .enqueue(EntityKind::Mother, "mothers", payload("m-1"), None)
            .unwrap();
        assert!(queue.get(id2).unwrap().payload.get("password").is_none());
    }

    #[test]
    fn select_batch_excludes_ineligible() {
        let queue = SyncQueue::in_memory();
        let a = queue
            .enqueue(EntityKind::Mother, "mothers", payload("a"), None)
            .unwrap();
        let b = queue
            .enqueue(EntityKind::Mother, "mothers", payload("b"), None)
            .unwrap();
        let c = queue
            .enqueue(EntityKind::Mother, "mothers", payload("c"), None)
            .unwrap();

        queue.mark_sending(&[a]).unwrap();
        queue.mark_done(a).unwrap();
        queue.mark_sending(&[b]).unwrap();

        let batch = queue.select_batch();
        let ids: Vec<u64> = batch.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c]);
    }

    #[test]
    fn send_failure_and_retry_flow() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::Session, "capture_sessions", payload("s"), None)
            .unwrap();

        queue.mark_sending(&[id]).unwrap();
        let status = queue.mark_failed(id, "timeout", 3).unwrap();
        assert_eq!(status, QueueStatus::Error);

        let item = queue.get(id).unwrap();
        assert_eq!(item.attempts, 1);
        assert_eq!(item.last_error.as_deref(), Some("timeout"));

        // Error items are retried.
        assert_eq!(queue.select_batch().len(), 1);
    }

    #[test]
    fn third_failure_escalates_to_conflict() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::Form, "capture_forms", payload("f"), None)
            .unwrap();

        for round in 1..=3u32 {
            queue.mark_sending(&[id]).unwrap();
            let status = queue.mark_failed(id, "rejected", 3).unwrap();
            if round < 3 {
                assert_eq!(status, QueueStatus::Error);
            } else {
                assert_eq!(status, QueueStatus::Conflict);
            }
        }

        // Conflict items are excluded from batches and never auto-retried.
        assert!(queue.select_batch().is_empty());
        let err = queue.mark_sending(&[id]).unwrap_err();
        assert!(matches!(err, QueueError::InvalidTransition { .. }));
    }

    #[test]
    fn reset_returns_conflict_to_pending() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::Form, "capture_forms", payload("f"), None)
            .unwrap();
        for _ in 0..3 {
            queue.mark_sending(&[id]).unwrap();
            queue.mark_failed(id, "rejected", 3).unwrap();
        }
        assert_eq!(queue.get(id).unwrap().status, QueueStatus::Conflict);

        queue.reset(id).unwrap();
        let item = queue.get(id).unwrap();
        assert_eq!(item.status, QueueStatus::Pending);
        assert_eq!(item.attempts, 0);
        assert!(item.last_error.is_none());
    }

    #[test]
    fn success_clears_error_and_enables_gc() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::Audit, "audits", payload("a"), None)
            .unwrap();

        queue.mark_sending(&[id]).unwrap();
        queue.mark_failed(id, "blip", 3).unwrap();
        queue.mark_sending(&[id]).unwrap();
        queue.mark_done(id).unwrap();

        let item = queue.get(id).unwrap();
        assert_eq!(item.status, QueueStatus::Done);
        assert!(item.last_error.is_none());
        assert_eq!(item.attempts, 2);

        assert_eq!(queue.collect_garbage().unwrap(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn discard_refuses_in_flight() {
        let queue = SyncQueue::in_memory();
        let id = queue
            .enqueue(EntityKind::Mother, "mothers", payload("m"), None)
            .unwrap();
        queue.mark_sending(&[id]).unwrap();
        assert!(queue.discard(id).is_err());

        queue.mark_failed(id, "x", 3).unwrap();
        let item = queue.discard(id).unwrap();
        assert_eq!(item.id, id);
        assert!(queue.is_empty());
    }

    #[test]
    fn mark_sending_is_all_or_nothing() {
        let queue = SyncQueue::in_memory();
        let a = queue
            .enqueue(EntityKind::Mother, "mothers", payload("a"), None)
            .unwrap();

        let err = queue.mark_sending(&[a, 999]).unwrap_err();
        assert!(matches!(err, QueueError::ItemNotFound(999)));
        assert_eq!(queue.get(a).unwrap().status, QueueStatus::Pending);
        assert_eq!(queue.get(a).unwrap().attempts, 0);
    }

    #[test]
    fn counts_track_statuses() {
        let queue = SyncQueue::in_memory();
        let a = queue
            .enqueue(EntityKind::Mother, "mothers", payload("a"), None)
            .unwrap();
        let b = queue
            .enqueue(EntityKind::Mother, "mothers", payload("b"), None)
            .unwrap();
        queue
            .enqueue(EntityKind::Mother, "mothers", payload("c"), None)
            .unwrap();

        queue.mark_sending(&[a, b]).unwrap();
        queue.mark_done(a).unwrap();
        queue.mark_failed(b, "x", 3).unwrap();

        let counts = queue.counts();
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.done, 1);
        assert_eq!(counts.error, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn clear_error_attempts() {
        let queue = SyncQueue::in_memory();
        let a = queue
            .enqueue(EntityKind::Mother, "mothers", payload("a"), None)
            .unwrap();
        queue.mark_sending(&[a]).unwrap();
        queue.mark_failed(a, "x", 3).unwrap();
        assert_eq!(queue.get(a).unwrap().attempts, 1);

        assert_eq!(queue.clear_error_attempts().unwrap(), 1);
        assert_eq!(queue.get(a).unwrap().attempts, 0);
        assert_eq!(queue.get(a).unwrap().status, QueueStatus::Error);
    }

    mod durability {
        use super::*;
        use crate::journal::FileStore;

        #[test]
        fn queue_state_survives_reopen() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("queue.journal");

            let (pending_id, error_id) = {
                let queue = SyncQueue::open_file(&path).unwrap();
                let p = queue
                    .enqueue(EntityKind::Mother, "mothers", payload("p"), None)
                    .unwrap();
                let e = queue
                    .enqueue(EntityKind::Baby, "babies", payload("e"), None)
                    .unwrap();
                queue.mark_sending(&[e]).unwrap();
                queue.mark_failed(e, "refused", 3).unwrap();
                (p, e)
            };

            let queue = SyncQueue::open_file(&path).unwrap();
            assert_eq!(queue.len(), 2);
            assert_eq!(queue.get(pending_id).unwrap().status, QueueStatus::Pending);

            let error_item = queue.get(error_id).unwrap();
            assert_eq!(error_item.status, QueueStatus::Error);
            assert_eq!(error_item.attempts, 1);
            assert_eq!(error_item.last_error.as_deref(), Some("refused"));
        }

        #[test]
        fn sending_recovers_as_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("queue.journal");

            let id = {
                let queue = SyncQueue::open_file(&path).unwrap();
                let id = queue
                    .enqueue(EntityKind::Session, "capture_sessions", payload("s"), None)
                    .unwrap();
                queue.mark_sending(&[id]).unwrap();
                id
                // Dropped mid-flight: simulates a crash before the
                // acknowledgement was applied.
            };

            let queue = SyncQueue::open_file(&path).unwrap();
            let item = queue.get(id).unwrap();
            assert_eq!(item.status, QueueStatus::Error);
            assert_eq!(item.attempts, 1);
            assert!(item.last_error.as_deref().unwrap().contains("interrupted"));

            // Recovered items go straight back into the next batch.
            assert_eq!(queue.select_batch().len(), 1);
        }

        #[test]
        fn new_ids_never_reuse_removed_ones() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("queue.journal");

            let discarded = {
                let queue = SyncQueue::open_file(&path).unwrap();
                let a = queue
                    .enqueue(EntityKind::Mother, "mothers", payload("a"), None)
                    .unwrap();
                queue.discard(a).unwrap();
                a
            };

            let queue = SyncQueue::open_file(&path).unwrap();
            let b = queue
                .enqueue(EntityKind::Mother, "mothers", payload("b"), None)
                .unwrap();
            assert!(b > discarded);
        }

        #[test]
        fn gc_compacts_journal() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("queue.journal");
            let queue = SyncQueue::open_file(&path).unwrap();

            let mut ids = Vec::new();
            for i in 0..10 {
                ids.push(
                    queue
                        .enqueue(EntityKind::Audit, "audits", payload(&format!("a-{i}")), None)
                        .unwrap(),
                );
            }
            queue.mark_sending(&ids).unwrap();
            for &id in &ids {
                queue.mark_done(id).unwrap();
            }

            queue.collect_garbage().unwrap();
            drop(queue);

            let store = FileStore::open(&path).unwrap();
            let journal = Journal::new(Box::new(store), false);
            let replay = journal.replay().unwrap();
            assert!(replay.records.is_empty());
        }
    }
}
