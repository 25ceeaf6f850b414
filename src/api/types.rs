//! Raw upstream record types
//!
//! Every field is optional: the upstream routinely returns entries with
//! holes in them (untraded instruments, halted symbols), and a partially
//! populated entry must still reach the index normalizer.

use serde::Deserialize;

/// One entry of a quote response
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuote {
    /// Resource URL of the instrument this quote belongs to
    pub instrument: Option<String>,
    pub symbol: Option<String>,
    pub ask_price: Option<String>,
    pub ask_size: Option<i64>,
    pub bid_price: Option<String>,
    pub bid_size: Option<i64>,
    pub last_trade_price: Option<String>,
    pub last_extended_hours_trade_price: Option<String>,
    pub previous_close: Option<String>,
    pub has_traded: Option<bool>,
    pub trading_halted: Option<bool>,
    pub updated_at: Option<String>,
}

/// One entry of a popularity response
#[derive(Debug, Clone, Deserialize)]
pub struct RawPopularity {
    /// Resource URL of the instrument
    pub instrument: Option<String>,
    /// Number of accounts holding an open position
    pub num_open_positions: Option<i64>,
}
