//! SQLite schema definitions
//!
//! Single-table schema applied idempotently at startup.

/// Complete schema SQL
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS file_records (
    id TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    bytes INTEGER NOT NULL CHECK(bytes >= 0),
    purpose TEXT NOT NULL CHECK(purpose IN (
        'fine-tune', 'fine-tune-results', 'assistants', 'assistants_output'
    )),
    created_at INTEGER NOT NULL,
    expiration INTEGER NOT NULL,
    content_type TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_file_records_expiration ON file_records(expiration);
"#;
