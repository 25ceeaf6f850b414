//! SQLite persistence layer
//!
//! A single `Store` wraps the connection and exposes the two batch write
//! operations the pipeline needs. Writes are row-tolerant: one bad row never
//! aborts its batch, and the index write and the quote fact write are
//! independent failure domains.

pub mod models;

mod index;
mod migrations;
mod popularity;
mod quotes;

use crate::error::Result;
use chrono::Utc;
use models::{IndexEntry, QuoteRecord};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

/// SQLite store wrapper
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database and run migrations
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode keeps concurrent worker processes safe
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;

        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    /// Persist a quote batch: upsert the tradability index, then insert the
    /// fact rows. Each write is best-effort and a failure in one never
    /// blocks the other.
    pub fn store_quotes(&self, entries: &[IndexEntry], records: &[QuoteRecord]) {
        let conn = self.conn.lock();

        match index::upsert_entries(&conn, entries) {
            Ok(written) => tracing::debug!("Upserted {} index entries", written),
            Err(e) => tracing::error!("Index batch write failed: {}", e),
        }

        match quotes::insert_quotes(&conn, records) {
            Ok(inserted) => tracing::debug!("Stored {} quote rows", inserted),
            Err(e) => tracing::error!("Quote batch write failed: {}", e),
        }
    }

    /// Persist a popularity batch as one timestamped row per instrument
    pub fn store_popularities(&self, counts: &HashMap<String, i64>) -> Result<usize> {
        let conn = self.conn.lock();
        let stored = popularity::insert_counts(&conn, counts, Utc::now())?;
        tracing::debug!("Stored {} popularity rows", stored);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn record(id: &str, updated_at: Option<DateTime<Utc>>) -> QuoteRecord {
        QuoteRecord {
            instrument_id: id.to_string(),
            symbol: Some("AAPL".to_string()),
            ask_price: Some("185.10".to_string()),
            ask_size: Some(100),
            bid_price: Some("185.00".to_string()),
            bid_size: Some(300),
            last_trade_price: Some("185.05".to_string()),
            last_extended_hours_trade_price: None,
            previous_close: Some("184.20".to_string()),
            updated_at,
        }
    }

    fn entry(id: &str, halted: bool) -> IndexEntry {
        IndexEntry {
            instrument_id: id.to_string(),
            timestamp: Utc::now(),
            has_traded: Some(true),
            updated_at: Some(Utc::now()),
            trading_halted: Some(halted),
        }
    }

    fn open_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (store, dir)
    }

    fn count(store: &Store, sql: &str) -> i64 {
        store.conn.lock().query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_store_quotes_idempotent() {
        let (store, _dir) = open_store();
        let updated = Some(Utc.with_ymd_and_hms(2018, 6, 29, 20, 0, 0).unwrap());
        let records = vec![record("1", updated), record("2", updated)];
        let entries = vec![entry("1", false), entry("2", false)];

        store.store_quotes(&entries, &records);
        store.store_quotes(&entries, &records);

        // Second insert's duplicate-key failures are swallowed, no new rows
        assert_eq!(count(&store, "SELECT COUNT(*) FROM quotes"), 2);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM instrument_index"), 2);
    }

    #[test]
    fn test_store_quotes_partial_batch_survives_duplicates() {
        let (store, _dir) = open_store();
        let updated = Some(Utc.with_ymd_and_hms(2018, 6, 29, 20, 0, 0).unwrap());

        store.store_quotes(&[entry("1", false)], &[record("1", updated)]);

        // One duplicate, one fresh row: the fresh row still commits
        store.store_quotes(
            &[entry("1", false), entry("2", false)],
            &[record("1", updated), record("2", updated)],
        );

        assert_eq!(count(&store, "SELECT COUNT(*) FROM quotes"), 2);
    }

    #[test]
    fn test_index_upsert_converges() {
        let (store, _dir) = open_store();

        store.store_quotes(&[entry("1", false)], &[]);
        store.store_quotes(&[entry("1", true)], &[]);

        let halted: bool = store
            .conn
            .lock()
            .query_row(
                "SELECT trading_halted FROM instrument_index WHERE instrument_id = '1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(halted);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM instrument_index"), 1);
    }

    #[test]
    fn test_index_write_independent_of_quote_write() {
        let (store, _dir) = open_store();
        let updated = Some(Utc.with_ymd_and_hms(2018, 6, 29, 20, 0, 0).unwrap());
        let records = vec![record("1", updated)];

        // Same fact rows twice, fresh index state both times: the duplicate
        // fact insert must not stop the index from converging
        store.store_quotes(&[entry("1", false)], &records);
        store.store_quotes(&[entry("1", true)], &records);

        let halted: bool = store
            .conn
            .lock()
            .query_row(
                "SELECT trading_halted FROM instrument_index WHERE instrument_id = '1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(halted);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM quotes"), 1);
    }

    #[test]
    fn test_store_popularities_appends_time_series() {
        let (store, _dir) = open_store();
        let counts = HashMap::from([("9".to_string(), 7), ("2".to_string(), 3)]);

        assert_eq!(store.store_popularities(&counts).unwrap(), 2);
        assert_eq!(store.store_popularities(&counts).unwrap(), 2);

        // No dedup: each call appends a full set of rows
        assert_eq!(count(&store, "SELECT COUNT(*) FROM popularity"), 4);
        assert_eq!(
            count(
                &store,
                "SELECT COUNT(*) FROM popularity WHERE instrument_id = '9' AND popularity = 7"
            ),
            2
        );
    }
}
