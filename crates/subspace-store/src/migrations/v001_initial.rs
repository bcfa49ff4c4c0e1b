//! v001 -- Initial schema creation.
//!
//! Creates the single `documents` table holding the persisted JSON
//! documents (`wallet-connection`, `subspace-cache`, `global-ui-state`).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    key        TEXT PRIMARY KEY NOT NULL,   -- document name
    json       TEXT NOT NULL,               -- serialized document body
    updated_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
