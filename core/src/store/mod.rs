//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The generator and engine call store methods and never execute SQL directly.

mod cdr;
mod subscriber;

use crate::error::CdrResult;
use rusqlite::Connection;

pub struct CdrStore {
    conn: Connection,
}

impl CdrStore {
    pub fn open(path: &str) -> CdrResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        log::debug!("opened cdr store at {path}");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CdrResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    fn table_exists(&self, table: &str) -> CdrResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
