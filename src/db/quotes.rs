//! Quote fact table writes

use crate::db::models::QuoteRecord;
use crate::error::Result;
use rusqlite::{params, Connection};

/// Insert quote rows one at a time so the batch tolerates individual
/// failures. Duplicate-key failures are the expected signal for rows we
/// already hold and are swallowed; anything else is logged and the rest of
/// the batch still commits.
pub fn insert_quotes(conn: &Connection, records: &[QuoteRecord]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO quotes (
            instrument_id, symbol, ask_price, ask_size, bid_price, bid_size,
            last_trade_price, last_extended_hours_trade_price, previous_close, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;

    let mut inserted = 0;
    for record in records {
        let result = stmt.execute(params![
            record.instrument_id,
            record.symbol,
            record.ask_price,
            record.ask_size,
            record.bid_price,
            record.bid_size,
            record.last_trade_price,
            record.last_extended_hours_trade_price,
            record.previous_close,
            record.updated_at.map(|t| t.to_rfc3339()),
        ]);

        match result {
            Ok(_) => inserted += 1,
            Err(e) if is_duplicate(&e) => {
                tracing::debug!("Skipping duplicate quote row: {}", record.instrument_id);
            }
            Err(e) => {
                tracing::error!(
                    "Unhandled error during quote batch write for {}: {}",
                    record.instrument_id,
                    e
                );
            }
        }
    }

    Ok(inserted)
}

/// True when the error is a unique-constraint violation
fn is_duplicate(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    )
}
