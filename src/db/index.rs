//! Tradability index writes

use crate::db::models::IndexEntry;
use crate::error::Result;
use rusqlite::{params, Connection};

/// Upsert index entries keyed by instrument_id. Row failures are logged and
/// never abort the remainder of the batch.
pub fn upsert_entries(conn: &Connection, entries: &[IndexEntry]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO instrument_index (instrument_id, timestamp, has_traded, updated_at, trading_halted)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(instrument_id) DO UPDATE SET
             timestamp = excluded.timestamp,
             has_traded = excluded.has_traded,
             updated_at = excluded.updated_at,
             trading_halted = excluded.trading_halted",
    )?;

    let mut written = 0;
    for entry in entries {
        let result = stmt.execute(params![
            entry.instrument_id,
            entry.timestamp.to_rfc3339(),
            entry.has_traded,
            entry.updated_at.map(|t| t.to_rfc3339()),
            entry.trading_halted,
        ]);

        match result {
            Ok(_) => written += 1,
            Err(e) => {
                tracing::error!(
                    "Unhandled error during index write for {}: {}",
                    entry.instrument_id,
                    e
                );
            }
        }
    }

    Ok(written)
}
