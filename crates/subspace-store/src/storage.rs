//! Local document storage.
//!
//! The [`LocalStore`] owns a [`rusqlite::Connection`] holding one `documents`
//! table: a key-value mapping from document name to JSON text. Each persisted
//! surface (wallet connection, entity cache, UI state) is one independently
//! serialized document, so corrupting one never takes the others down.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/subspace/subspace.db`
    /// - macOS:   `~/Library/Application Support/com.subspace.subspace/subspace.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\subspace\subspace\data\subspace.db`
    pub fn open_default() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "subspace", "subspace").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("subspace.db");

        tracing::info!(path = %db_path.display(), "opening local store");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;

        // Run schema migrations.
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read one document's JSON text, `None` if it has never been written.
    pub fn document(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("local store poisoned");
        let json = conn
            .query_row(
                "SELECT json FROM documents WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(json)
    }

    /// Write (or replace) one document.
    pub fn put_document(&self, key: &str, json: &str) -> Result<()> {
        let conn = self.conn.lock().expect("local store poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO documents (key, json, updated_at) VALUES (?1, ?2, ?3)",
            params![key, json, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete one document. Deleting a missing document is not an error.
    pub fn delete_document(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("local store poisoned");
        conn.execute("DELETE FROM documents WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        let conn = self.conn.lock().expect("local store poisoned");
        conn.path().map(PathBuf::from)
    }
}
