use super::CdrStore;
use crate::{error::CdrResult, types::Msisdn};
use rusqlite::params;

impl CdrStore {
    // ── Subscribers ───────────────────────────────────────────────

    pub fn subscriber_table_exists(&self) -> CdrResult<bool> {
        self.table_exists("subscribers")
    }

    pub fn create_subscriber_table(&self) -> CdrResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_subscribers.sql"))?;
        Ok(())
    }

    pub fn insert_subscribers<'a, I>(&self, msisdns: I) -> CdrResult<usize>
    where
        I: IntoIterator<Item = &'a Msisdn>,
    {
        let mut stmt = self
            .conn
            .prepare("INSERT INTO subscribers (msisdn) VALUES (?1)")?;
        let mut inserted = 0usize;
        for msisdn in msisdns {
            inserted += stmt.execute(params![msisdn])?;
        }
        Ok(inserted)
    }

    /// All subscribers, ordered by phone number.
    pub fn list_subscribers(&self) -> CdrResult<Vec<Msisdn>> {
        let mut stmt = self
            .conn
            .prepare("SELECT msisdn FROM subscribers ORDER BY msisdn ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
