//! Table registry and payload sanitization.
//!
//! Every table the server reconciles is declared here with its natural
//! key and column allow-list. Incoming payloads are sanitized by key
//! intersection: unknown keys are dropped silently, never errors, so
//! newer clients can send fields an older server does not know yet.

use fieldsync_protocol::RowData;

/// The natural key a table's upserts conflict on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKey {
    /// Global identifier (the default reconciliation key).
    Uuid,
    /// Unique email; used for `users`, whose accounts may predate
    /// uuid assignment on some devices.
    Email,
}

impl ConflictKey {
    /// The column holding the key.
    pub fn column(&self) -> &'static str {
        match self {
            ConflictKey::Uuid => "uuid",
            ConflictKey::Email => "email",
        }
    }

    /// Whether two key values match.
    ///
    /// Emails compare case-insensitively; identifiers compare exactly.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            ConflictKey::Uuid => a == b,
            ConflictKey::Email => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Declaration of one reconciled table.
#[derive(Debug, Clone, Copy)]
pub struct TableConfig {
    /// Table name on the wire and in the store.
    pub name: &'static str,
    /// Natural key upserts conflict on.
    pub conflict_key: ConflictKey,
    /// Columns accepted from clients; everything else is dropped.
    pub columns: &'static [&'static str],
}

/// All reconciled tables.
pub const TABLES: &[TableConfig] = &[
    TableConfig {
        name: "users",
        conflict_key: ConflictKey::Email,
        columns: &[
            "uuid",
            "name",
            "email",
            "document",
            "birth_date",
            "role",
            "active",
            "admin",
            "password",
            "created_at",
            "updated_at",
        ],
    },
    TableConfig {
        name: "mothers",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "name",
            "document",
            "id_number",
            "birth_date",
            "phone",
            "address",
            "created_at",
        ],
    },
    TableConfig {
        name: "babies",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "mother_id",
            "name",
            "birth_date",
            "sex",
            "birth_order",
            "created_at",
        ],
    },
    TableConfig {
        name: "scanners",
        conflict_key: ConflictKey::Uuid,
        columns: &["uuid", "name", "model", "serial_number", "active", "last_used"],
    },
    TableConfig {
        name: "reference_files",
        conflict_key: ConflictKey::Uuid,
        columns: &["uuid", "baby_id", "file_path", "captured_at", "created_at"],
    },
    TableConfig {
        name: "capture_sessions",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "user_id",
            "mother_id",
            "baby_id",
            "scanner_id",
            "session_type",
            "origin_session_id",
            "matching_enabled",
            "matching_ref_id",
            "started_at",
            "finished_at",
            "status",
            "sync_status",
            "created_at",
        ],
    },
    TableConfig {
        name: "finger_captures",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "session_id",
            "finger_type",
            "quality",
            "frames_ok",
            "frames_total",
            "result",
            "image_path",
            "created_at",
        ],
    },
    TableConfig {
        name: "capture_forms",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "session_id",
            "temperature",
            "humidity",
            "mixture_type",
            "questionnaire_version",
            "notes",
            "partial_reason",
            "quick_capture",
            "created_at",
        ],
    },
    TableConfig {
        name: "audits",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "user_id",
            "action",
            "entity",
            "entity_id",
            "old_values",
            "new_values",
            "device",
            "ip_address",
            "sync_status",
            "created_at",
        ],
    },
    TableConfig {
        name: "login_events",
        conflict_key: ConflictKey::Uuid,
        columns: &[
            "uuid",
            "user_id",
            "email",
            "success",
            "failure_reason",
            "device",
            "ip_address",
            "created_at",
        ],
    },
];

/// Looks a table up by name.
pub fn lookup(name: &str) -> Option<&'static TableConfig> {
    TABLES.iter().find(|t| t.name == name)
}

/// Intersects a payload with the table's column allow-list.
pub fn sanitize(data: &RowData, config: &TableConfig) -> RowData {
    data.iter()
        .filter(|(key, _)| config.columns.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup("users").unwrap().conflict_key, ConflictKey::Email);
        assert_eq!(lookup("babies").unwrap().conflict_key, ConflictKey::Uuid);
        assert!(lookup("unknown_table").is_none());
    }

    #[test]
    fn every_table_accepts_its_conflict_key() {
        for table in TABLES {
            assert!(
                table.columns.contains(&table.conflict_key.column()),
                "{} must accept {}",
                table.name,
                table.conflict_key.column()
            );
        }
    }

    #[test]
    fn registry_matches_protocol_tables() {
        for table in fieldsync_protocol::known_tables() {
            assert!(lookup(table).is_some(), "missing registry entry: {table}");
        }
        assert_eq!(TABLES.len(), fieldsync_protocol::known_tables().count());
    }

    #[test]
    fn sanitize_drops_unknown_keys() {
        let config = lookup("mothers").unwrap();
        let mut data = RowData::new();
        data.insert("uuid".into(), json!("m-1"));
        data.insert("name".into(), json!("Ana"));
        data.insert("injected".into(), json!("DROP TABLE mothers"));
        data.insert("admin".into(), json!(true));

        let clean = sanitize(&data, config);
        assert_eq!(clean.len(), 2);
        assert!(clean.contains_key("uuid"));
        assert!(clean.contains_key("name"));
        assert!(!clean.contains_key("injected"));
        assert!(!clean.contains_key("admin"));
    }

    #[test]
    fn email_matching_is_case_insensitive() {
        assert!(ConflictKey::Email.matches("Op@Example.com", "op@example.com"));
        assert!(!ConflictKey::Email.matches("a@example.com", "b@example.com"));
        assert!(ConflictKey::Uuid.matches("abc-123", "abc-123"));
        assert!(!ConflictKey::Uuid.matches("ABC-123", "abc-123"));
    }
}
