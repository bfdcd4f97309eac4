use super::CdrStore;
use crate::{
    error::{CdrError, CdrResult},
    record::{CallDirection, CallRecord},
    sink::CallSink,
};
use rusqlite::params;

impl CdrStore {
    // ── Call detail records ───────────────────────────────────────

    /// Drop-if-exists then create, so a run only ever sees its own calls.
    pub fn recreate_cdr_table(&self) -> CdrResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/002_cdr.sql"))?;
        Ok(())
    }

    pub fn insert_cdr(&self, record: &CallRecord) -> CdrResult<()> {
        self.conn.execute(
            "INSERT INTO cdr (call_type, msisdn, start_time_unix, end_time_unix)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.direction.code(),
                &record.msisdn,
                record.start,
                record.end,
            ],
        )?;
        Ok(())
    }

    pub fn cdr_count(&self) -> CdrResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM cdr", [], |row| row.get(0))?;
        Ok(count)
    }

    /// A subscriber's calls in chronological order.
    pub fn cdrs_for_subscriber(&self, msisdn: &str) -> CdrResult<Vec<CallRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT call_type, msisdn, start_time_unix, end_time_unix
             FROM cdr WHERE msisdn = ?1
             ORDER BY start_time_unix ASC",
        )?;
        let rows = stmt.query_map(params![msisdn], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (code, msisdn, start, end) = row?;
            let direction = CallDirection::from_code(&code)
                .ok_or_else(|| CdrError::MalformedRecord(format!("call_type {code}")))?;
            records.push(CallRecord::new(direction, msisdn, start, end));
        }
        Ok(records)
    }
}

impl CallSink for CdrStore {
    fn record_call(&mut self, record: &CallRecord) -> CdrResult<()> {
        self.insert_cdr(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(subscribers: &[&str]) -> CdrStore {
        let store = CdrStore::in_memory().unwrap();
        store.create_subscriber_table().unwrap();
        let owned: Vec<String> = subscribers.iter().map(|s| s.to_string()).collect();
        store.insert_subscribers(&owned).unwrap();
        store.recreate_cdr_table().unwrap();
        store
    }

    #[test]
    fn inserted_call_reads_back() {
        let store = store_with(&["79123456789"]);
        let record = CallRecord::new(CallDirection::Outgoing, "79123456789", 1717245455, 1717248904);
        store.insert_cdr(&record).unwrap();

        assert_eq!(store.cdr_count().unwrap(), 1);
        assert_eq!(store.cdrs_for_subscriber("79123456789").unwrap(), vec![record]);
    }

    #[test]
    fn call_for_unknown_subscriber_violates_foreign_key() {
        let store = store_with(&["79123456789"]);
        let record = CallRecord::new(CallDirection::Incoming, "79000000000", 10, 20);
        assert!(matches!(store.insert_cdr(&record), Err(CdrError::Database(_))));
    }

    #[test]
    fn recreate_clears_previous_calls() {
        let store = store_with(&["79123456789"]);
        store
            .insert_cdr(&CallRecord::new(CallDirection::Incoming, "79123456789", 10, 20))
            .unwrap();
        store.recreate_cdr_table().unwrap();
        assert_eq!(store.cdr_count().unwrap(), 0);
    }

    #[test]
    fn duplicate_start_for_same_subscriber_is_rejected() {
        let store = store_with(&["79123456789"]);
        store
            .insert_cdr(&CallRecord::new(CallDirection::Incoming, "79123456789", 10, 20))
            .unwrap();
        let dup = CallRecord::new(CallDirection::Outgoing, "79123456789", 10, 30);
        assert!(store.insert_cdr(&dup).is_err());
    }
}
