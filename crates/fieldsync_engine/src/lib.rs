//! # FieldSync Engine
//!
//! The client side of FieldSync: drives sync cycles that drain the
//! durable queue into the reconciliation server and fold server
//! snapshots back into the local entity store.
//!
//! This crate provides:
//! - [`SyncEngine`]: cycle orchestration with a single in-flight guard
//! - [`PushTransport`]: the network seam, with a mock and an HTTP
//!   implementation over a pluggable [`HttpClient`]
//! - [`EntityStore`]: the local-store seam used by pull-merge
//! - [`merge_snapshot`]: the pull-merge itself
//!
//! ## Key invariants
//!
//! - At most one sync cycle is in flight at any time
//! - A transport-level failure fails the whole batch as retryable;
//!   partial success is never inferred from a failed request
//! - An item with no matching acknowledgement is marked failed, never
//!   left in flight
//! - Item failures escalate to `Conflict` at the configured ceiling
//!   and are excluded from further batches until an operator acts

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod pull;
mod store;
mod transport;

pub use config::EngineConfig;
pub use engine::{CycleReport, SyncEngine, SyncReport, SyncStats};
pub use error::{EngineError, EngineResult};
pub use http::{HttpClient, HttpTransport};
pub use pull::{merge_snapshot, MergeReport};
pub use store::{EntityStore, MemoryEntityStore, MergeOutcome};
pub use transport::{MockTransport, PushTransport};
