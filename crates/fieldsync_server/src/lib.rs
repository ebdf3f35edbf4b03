//! # FieldSync Server
//!
//! The reconciliation side of FieldSync: validates, sanitizes, and
//! applies client-submitted mutations to the system of record as
//! idempotent upserts, and serves pull snapshots back to clients.
//!
//! This crate provides:
//! - The table registry with per-table column allow-lists and natural
//!   keys ([`tables`])
//! - [`RecordStore`]: the system-of-record seam, with an in-memory
//!   reference implementation
//! - [`SyncHandler`]: per-item push application and pull snapshots
//! - [`SyncServer`]: the facade combining handlers with bearer-token
//!   authentication
//!
//! ## Key invariants
//!
//! - One acknowledgement per submitted item, correlated by `clientRef`
//! - Item isolation: a failing item never aborts its siblings
//! - Upserts are idempotent on each table's natural key (global
//!   identifier, email for `users`)
//! - User passwords are stored hashed, never plaintext

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod handler;
mod hex;
mod password;
mod server;
mod store;
pub mod tables;

pub use auth::{AuthConfig, TokenValidator};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::SyncHandler;
pub use password::{hash_default_password, hash_password, is_hashed, verify_password};
pub use server::SyncServer;
pub use store::{MemoryStore, RecordStore, UpsertOutcome};
