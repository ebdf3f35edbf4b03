//! # FieldSync Queue
//!
//! The durable client-side sync queue.
//!
//! This crate provides:
//! - [`QueueItem`] and its lifecycle state machine
//! - An append-only, CRC-framed journal with crash recovery
//! - [`SyncQueue`]: enqueue, dependency-ordered batch selection,
//!   per-item acknowledgement transitions, garbage collection
//!
//! ## Key invariants
//!
//! - The queue is independent of the entity tables it references;
//!   payloads are full snapshots taken at enqueue time
//! - Attempts only increase, except through explicit operator resets
//! - A `Sending` item found at startup is recovered as retryable,
//!   never assumed complete
//! - `Done` and `Conflict` are terminal; `Conflict` requires operator
//!   action and is never auto-retried

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod item;
mod journal;
mod queue;
mod scheduler;

pub use error::{QueueError, QueueResult};
pub use item::{now_millis, QueueItem, QueueStatus};
pub use journal::{FileStore, Journal, JournalRecord, JournalStore, MemoryStore};
pub use queue::{QueueCounts, SyncQueue};
pub use scheduler::{batch_key, sort_batch};
