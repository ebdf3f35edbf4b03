//! Batch ordering.
//!
//! The scheduler orders eligible items by a composite key so that a
//! batch applied in order never references a row the same batch has not
//! delivered yet: dependency rank first, then priority, then creation
//! time, then id as the final tie-break. The dependency graph between
//! entity kinds is a fixed shallow DAG, so a constant rank table gives a
//! correct topological order without any graph traversal.

use crate::item::QueueItem;

/// The composite sort key for one item.
pub fn batch_key(item: &QueueItem) -> (u8, u8, u64, u64) {
    (
        item.kind.dependency_rank(),
        item.priority,
        item.created_at,
        item.id,
    )
}

/// Sorts a batch in transmission order.
pub fn sort_batch(items: &mut [QueueItem]) {
    items.sort_by_key(batch_key);
}
