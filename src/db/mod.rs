//! SQLite-backed store for customers, recruits and competitors.
//!
//! The database lives at `~/.dealdesk/dealdesk.db` unless the config points
//! elsewhere. The query router only reads from it; the upsert helpers exist for
//! the seeder and for whatever owns the records.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

pub mod types;
pub use types::*;

pub(crate) mod query;

pub struct PipelineDb {
    conn: Connection,
}

impl PipelineDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at the default path and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path, creating parent directories.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL lets the MCP binary read while another process writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        log::debug!("Opened pipeline database at {}", path.display());
        Ok(Self { conn })
    }

    /// Open a database in read-only mode. The schema must already exist.
    pub fn open_readonly_at(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Default database path: `~/.dealdesk/dealdesk.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".dealdesk").join("dealdesk.db"))
    }

    /// Row counts for (customers, recruits, competitors).
    pub fn counts(&self) -> Result<(usize, usize, usize), DbError> {
        let count = |table: &str| -> Result<usize, DbError> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };
        Ok((count("customers")?, count("recruits")?, count("competitors")?))
    }
}

pub mod competitors;
pub mod customers;
pub mod recruits;

// =============================================================================
// Shared test utilities
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        assert_eq!(db.counts().expect("counts"), (0, 0, 0));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("pipeline.db");
        drop(PipelineDb::open_at(path.clone()).expect("first open"));
        let db = PipelineDb::open_at(path.clone()).expect("second open");
        assert_eq!(db.counts().expect("counts"), (0, 0, 0));
    }
}
