//! Sync cycle orchestration.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::pull::{merge_snapshot, MergeReport};
use crate::store::EntityStore;
use crate::transport::PushTransport;
use fieldsync_protocol::{PushItem, PushRequest};
use fieldsync_queue::{QueueCounts, QueueItem, QueueStatus, SyncQueue};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counters across the engine's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Push cycles that ran to completion (acknowledgements applied).
    pub cycles_completed: u64,
    /// Items acknowledged as applied.
    pub items_pushed: u64,
    /// Item-level failures recorded.
    pub items_failed: u64,
    /// Items escalated to `Conflict`.
    pub conflicts_escalated: u64,
    /// Rows merged by pull.
    pub rows_pulled: u64,
    /// Last cycle-level error (transport or pull), if any.
    pub last_error: Option<String>,
    /// When the last cycle completed.
    pub last_sync_time: Option<Instant>,
}

/// Outcome of one push cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Items handed to the transport.
    pub sent: usize,
    /// Items acknowledged as applied.
    pub succeeded: usize,
    /// Items that failed and stay retryable.
    pub failed: usize,
    /// Items that escalated to `Conflict`.
    pub escalated: usize,
    /// Acknowledged items garbage-collected at cycle end.
    pub collected: usize,
}

/// Outcome of a combined push-then-pull run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// The push cycle outcome.
    pub push: CycleReport,
    /// The pull-merge outcome; `None` if the pull failed (recorded in
    /// stats, never silently dropped).
    pub pull: Option<MergeReport>,
}

/// Drives sync cycles against a reconciliation server.
///
/// At most one cycle is in flight at any time: the engine holds an
/// explicit flag around the whole cycle, including the network call,
/// released through an RAII guard so an error path can never leave it
/// stuck. A second caller gets [`EngineError::SyncInProgress`] instead
/// of double-submitting queue items.
pub struct SyncEngine<T: PushTransport, S: EntityStore> {
    config: EngineConfig,
    queue: Arc<SyncQueue>,
    transport: Arc<T>,
    store: Arc<S>,
    in_flight: AtomicBool,
    stats: RwLock<SyncStats>,
}

/// Releases the in-flight flag when the cycle ends, normally or not.
struct CycleGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<T: PushTransport, S: EntityStore> SyncEngine<T, S> {
    /// Creates a new engine.
    pub fn new(config: EngineConfig, queue: Arc<SyncQueue>, transport: T, store: S) -> Self {
        Self {
            config,
            queue,
            transport: Arc::new(transport),
            store: Arc::new(store),
            in_flight: AtomicBool::new(false),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// The queue this engine drains.
    pub fn queue(&self) -> &Arc<SyncQueue> {
        &self.queue
    }

    /// The local entity store pull-merge writes into.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The transport used for push and pull (e.g. to attach a fresh
    /// bearer credential).
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// True while a cycle is in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Observable queue counts (pending/error/conflict etc.).
    pub fn counts(&self) -> QueueCounts {
        self.queue.counts()
    }

    /// Runs one push cycle: select, transmit, apply acknowledgements.
    pub fn push_pending(&self) -> EngineResult<CycleReport> {
        let _guard = self.begin_cycle()?;
        self.push_locked()
    }

    /// Fetches a server snapshot and merges it into the local store.
    pub fn pull_merge(&self) -> EngineResult<MergeReport> {
        let _guard = self.begin_cycle()?;
        self.pull_locked()
    }

    /// Push then pull under a single in-flight acquisition.
    ///
    /// A transport-level push failure aborts the run (the batch is
    /// already marked retryable). A pull failure is recorded in stats
    /// and reported as `pull: None`; pushed data is durable on the
    /// server either way.
    pub fn sync_all(&self) -> EngineResult<SyncReport> {
        let _guard = self.begin_cycle()?;

        let push = self.push_locked()?;
        let pull = match self.pull_locked() {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(error = %err, "pull-merge failed after push");
                self.stats.write().last_error = Some(err.to_string());
                None
            }
        };

        Ok(SyncReport { push, pull })
    }

    /// Manual retry: runs a push cycle, which picks up every `Error`
    /// item. With [`EngineConfig::reset_attempts_on_retry`] set, those
    /// items get a fresh attempt budget first.
    pub fn retry_all(&self) -> EngineResult<CycleReport> {
        if self.config.reset_attempts_on_retry {
            let cleared = self.queue.clear_error_attempts()?;
            debug!(cleared, "cleared attempt counters before retry");
        }
        self.push_pending()
    }

    /// Operator reset: returns one `Conflict`/`Error` item to `Pending`
    /// with a zeroed attempt counter.
    pub fn reset_item(&self, id: u64) -> EngineResult<()> {
        self.queue.reset(id)?;
        Ok(())
    }

    /// Operator discard: removes one item from the queue without
    /// touching its underlying entity row.
    pub fn discard_item(&self, id: u64) -> EngineResult<QueueItem> {
        Ok(self.queue.discard(id)?)
    }

    fn begin_cycle(&self) -> EngineResult<CycleGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::SyncInProgress);
        }
        Ok(CycleGuard {
            flag: &self.in_flight,
        })
    }

    fn push_locked(&self) -> EngineResult<CycleReport> {
        let mut batch = self.queue.select_batch();
        if batch.len() > self.config.max_push_batch {
            batch.truncate(self.config.max_push_batch);
        }

        let mut report = CycleReport {
            sent: batch.len(),
            ..CycleReport::default()
        };
        if batch.is_empty() {
            return Ok(report);
        }

        let ids: Vec<u64> = batch.iter().map(|i| i.id).collect();
        self.queue.mark_sending(&ids)?;

        let items: Vec<PushItem> = batch
            .iter()
            .map(|item| PushItem {
                client_ref: item.id,
                table: item.table.clone(),
                data: item.payload.clone(),
            })
            .collect();

        debug!(items = items.len(), "pushing batch");
        let response = match self.transport.push(&PushRequest::new(items)) {
            Ok(response) => response,
            Err(err) => {
                // Nothing was acknowledged; the whole batch retries.
                let message = err.to_string();
                for &id in &ids {
                    self.apply_failure(&mut report, id, &message)?;
                }
                self.stats.write().last_error = Some(message);
                return Err(err);
            }
        };

        for &id in &ids {
            match response.find(id) {
                Some(result) if result.is_ok() => {
                    self.queue.mark_done(id)?;
                    report.succeeded += 1;
                }
                Some(result) => {
                    let message = result.error.as_deref().unwrap_or("item rejected");
                    self.apply_failure(&mut report, id, message)?;
                }
                None => {
                    // An unacknowledged item is an explicit failure,
                    // never assumed successful.
                    self.apply_failure(&mut report, id, "no result returned")?;
                }
            }
        }

        report.collected = self.queue.collect_garbage()?;

        let mut stats = self.stats.write();
        stats.cycles_completed += 1;
        stats.items_pushed += report.succeeded as u64;
        stats.items_failed += (report.failed + report.escalated) as u64;
        stats.conflicts_escalated += report.escalated as u64;
        stats.last_sync_time = Some(Instant::now());
        if report.failed == 0 && report.escalated == 0 {
            stats.last_error = None;
        }
        drop(stats);

        info!(
            sent = report.sent,
            succeeded = report.succeeded,
            failed = report.failed,
            escalated = report.escalated,
            "push cycle complete"
        );
        Ok(report)
    }

    fn apply_failure(&self, report: &mut CycleReport, id: u64, message: &str) -> EngineResult<()> {
        let status = self
            .queue
            .mark_failed(id, message, self.config.conflict_ceiling)?;
        if status == QueueStatus::Conflict {
            report.escalated += 1;
        } else {
            report.failed += 1;
        }
        Ok(())
    }

    fn pull_locked(&self) -> EngineResult<MergeReport> {
        let snapshot = self.transport.pull()?;
        if !snapshot.ok {
            return Err(EngineError::Protocol("server reported failed snapshot".into()));
        }

        let report = merge_snapshot(self.store.as_ref(), &snapshot)?;
        let mut stats = self.stats.write();
        stats.rows_pulled += report.merged() as u64;
        stats.last_sync_time = Some(Instant::now());
        Ok(report)
    }
}
