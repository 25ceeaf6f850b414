//! Storage row models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One normalized quote fact row.
///
/// Prices stay as the decimal strings the upstream sends; coercing them to
/// floats here would silently lose precision. Unique on
/// (instrument_id, updated_at).
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRecord {
    pub instrument_id: String,
    pub symbol: Option<String>,
    pub ask_price: Option<String>,
    pub ask_size: Option<i64>,
    pub bid_price: Option<String>,
    pub bid_size: Option<i64>,
    pub last_trade_price: Option<String>,
    pub last_extended_hours_trade_price: Option<String>,
    pub previous_close: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Latest-known tradability status per instrument, upserted on every quote
/// batch independently of the fact rows.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub instrument_id: String,
    pub timestamp: DateTime<Utc>,
    pub has_traded: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
    pub trading_halted: Option<bool>,
}

/// One popularity observation; rows accumulate as a time series.
#[derive(Debug, Clone, Serialize)]
pub struct PopularityRecord {
    pub timestamp: DateTime<Utc>,
    pub instrument_id: String,
    pub popularity: i64,
}
