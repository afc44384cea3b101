//! SQLite schema definition.

/// Schema for the persistent local-storage table.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Local Storage (one row per key, value is opaque text)
-- ============================================================================

CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
