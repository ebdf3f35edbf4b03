//! Entity kinds and their sync ordering.

use serde::{Deserialize, Serialize};

/// The kind of entity a queued mutation belongs to.
///
/// Kinds carry two pieces of registry information: the destination table
/// on the server and a dependency rank. The rank encodes the foreign-key
/// DAG between entity tables so that a batch sorted by rank always
/// delivers referenced rows before the rows that reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// An operator account.
    User,
    /// A mother record.
    Mother,
    /// A baby record, referencing a mother.
    Baby,
    /// A fingerprint scanner device.
    Scanner,
    /// A captured reference image/file, stored alongside finger artifacts.
    ReferenceFile,
    /// A collection session, referencing user, mother, baby and scanner.
    Session,
    /// A single finger capture inside a session.
    Finger,
    /// The questionnaire form filled during a session.
    Form,
    /// An audit trail entry.
    Audit,
    /// A login attempt record.
    LoginEvent,
}

impl EntityKind {
    /// All kinds, in registry order.
    pub const ALL: [EntityKind; 10] = [
        EntityKind::User,
        EntityKind::Mother,
        EntityKind::Baby,
        EntityKind::Scanner,
        EntityKind::ReferenceFile,
        EntityKind::Session,
        EntityKind::Finger,
        EntityKind::Form,
        EntityKind::Audit,
        EntityKind::LoginEvent,
    ];

    /// Dependency rank; lower ranks must be applied first.
    ///
    /// Rank 1 entities have no foreign keys into other synced tables.
    /// Sessions (rank 2) reference rank-1 rows; finger captures and forms
    /// (rank 3) reference sessions; audit/login logs (rank 4) are terminal.
    pub fn dependency_rank(&self) -> u8 {
        match self {
            EntityKind::User
            | EntityKind::Mother
            | EntityKind::Baby
            | EntityKind::Scanner
            | EntityKind::ReferenceFile => 1,
            EntityKind::Session => 2,
            EntityKind::Finger | EntityKind::Form => 3,
            EntityKind::Audit | EntityKind::LoginEvent => 4,
        }
    }

    /// The server-side table this kind is reconciled into.
    ///
    /// Finger capture artifacts share `reference_files` with
    /// [`EntityKind::ReferenceFile`]; the capture rows themselves go to
    /// `finger_captures`.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Mother => "mothers",
            EntityKind::Baby => "babies",
            EntityKind::Scanner => "scanners",
            EntityKind::ReferenceFile => "reference_files",
            EntityKind::Session => "capture_sessions",
            EntityKind::Finger => "finger_captures",
            EntityKind::Form => "capture_forms",
            EntityKind::Audit => "audits",
            EntityKind::LoginEvent => "login_events",
        }
    }

    /// Default queue priority for this kind (lower is more urgent).
    pub fn default_priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }

    /// Looks a kind up by its registry table name.
    pub fn for_table(table: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.table() == table)
    }
}

/// Default priority assigned when the caller does not override it.
pub const DEFAULT_PRIORITY: u8 = 2;

/// Default password applied to `users` rows enqueued without one.
///
/// Both sides enforce the policy: the client fills the field before the
/// payload is journaled, and the server hashes a fresh default for any
/// user row that still arrives without a password. The plaintext default
/// itself is never stored server-side.
pub const DEFAULT_PASSWORD: &str = "123456";

/// Every table name the protocol recognizes.
pub fn known_tables() -> impl Iterator<Item = &'static str> {
    EntityKind::ALL.iter().map(|k| k.table())
}

/// Returns true if `table` belongs to the registry.
pub fn is_known_table(table: &str) -> bool {
    known_tables().any(|t| t == table)
}
