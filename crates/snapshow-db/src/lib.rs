pub mod comments;
pub mod error;
pub mod migrations;
pub mod models;
pub mod moderation;
pub mod notifications;
pub mod photos;
pub mod users;
pub mod votes;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ContestError;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Handle to the contest database. All core operations (moderation,
/// vote ledger, comment log, notification outbox, ranking queries) are
/// methods on this type, defined in the sibling modules.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, ContestError> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, ContestError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ContestError>
    where
        F: FnOnce(&Connection) -> Result<T, ContestError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ContestError::Internal(anyhow::anyhow!("DB lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Mutable access for multi-statement transactions.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, ContestError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ContestError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| ContestError::Internal(anyhow::anyhow!("DB lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}
