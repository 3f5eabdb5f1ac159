//! SQLite schema definition.

/// Complete database schema for the clinic store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Collections (key -> JSON array, rewritten whole on every save)
-- ============================================================================

CREATE TABLE IF NOT EXISTS collections (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON array of records
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Collection key for registered users.
pub const USERS_KEY: &str = "clinic_users";

/// Collection key for queued appointments.
pub const APPOINTMENTS_KEY: &str = "clinic_appointments";
