//! Popularity time-series writes

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;

/// Append one timestamped row per instrument. The table has no uniqueness
/// constraint; repeated fetches intentionally accumulate a time series.
pub fn insert_counts(
    conn: &Connection,
    counts: &HashMap<String, i64>,
    timestamp: DateTime<Utc>,
) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO popularity (timestamp, instrument_id, popularity) VALUES (?1, ?2, ?3)",
    )?;

    let stamp = timestamp.to_rfc3339();
    for (instrument_id, popularity) in counts {
        stmt.execute(params![stamp, instrument_id, popularity])?;
    }

    Ok(counts.len())
}
