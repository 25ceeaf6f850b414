//! Raw record normalization
//!
//! Maps upstream entries into storage-ready rows. Instrument identity is
//! derived from the resource URL embedded in every entry; entries without a
//! usable URL are skipped rather than failing the batch.

use crate::api::types::{RawPopularity, RawQuote};
use crate::db::models::{IndexEntry, QuoteRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use url::Url;

/// Extract the instrument id: the last non-empty path segment of the
/// resource URL. Insensitive to a trailing slash.
pub fn instrument_id(instrument_url: &str) -> Option<String> {
    let parsed = Url::parse(instrument_url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Parse an upstream `updated_at` timestamp. Null and unparsable values
/// pass through as None.
pub fn parse_updated_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(_) => {
            tracing::debug!("Skipping unparsable updated_at: {:?}", raw);
            None
        }
    }
}

/// Project raw quote entries into fact rows. Null entries and entries
/// without a resolvable instrument are dropped.
pub fn quote_records(raw: &[Option<RawQuote>]) -> Vec<QuoteRecord> {
    raw.iter()
        .flatten()
        .filter_map(|quote| {
            let id = quote.instrument.as_deref().and_then(instrument_id);
            let Some(id) = id else {
                tracing::warn!("Dropping quote without usable instrument URL: {:?}", quote.symbol);
                return None;
            };

            Some(QuoteRecord {
                instrument_id: id,
                symbol: quote.symbol.clone(),
                ask_price: quote.ask_price.clone(),
                ask_size: quote.ask_size,
                bid_price: quote.bid_price.clone(),
                bid_size: quote.bid_size,
                last_trade_price: quote.last_trade_price.clone(),
                last_extended_hours_trade_price: quote.last_extended_hours_trade_price.clone(),
                previous_close: quote.previous_close.clone(),
                updated_at: parse_updated_at(quote.updated_at.as_deref()),
            })
        })
        .collect()
}

/// Build tradability index entries for every entry the API returned,
/// independent of whether the quote fields were usable.
pub fn index_entries(raw: &[Option<RawQuote>], timestamp: DateTime<Utc>) -> Vec<IndexEntry> {
    raw.iter()
        .flatten()
        .filter_map(|quote| {
            let id = quote.instrument.as_deref().and_then(instrument_id)?;
            Some(IndexEntry {
                instrument_id: id,
                timestamp,
                has_traded: quote.has_traded,
                updated_at: parse_updated_at(quote.updated_at.as_deref()),
                trading_halted: quote.trading_halted,
            })
        })
        .collect()
}

/// Fold popularity entries into instrument_id -> open position count.
/// The last value wins when a batch repeats an instrument.
pub fn popularity_counts(raw: &[Option<RawPopularity>]) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for entry in raw.iter().flatten() {
        let Some(id) = entry.instrument.as_deref().and_then(instrument_id) else {
            tracing::warn!("Dropping popularity entry without instrument URL");
            continue;
        };
        let Some(count) = entry.num_open_positions else {
            tracing::warn!("Dropping popularity entry without count: {}", id);
            continue;
        };
        counts.insert(id, count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_quote(instrument: &str, symbol: &str) -> RawQuote {
        RawQuote {
            instrument: Some(instrument.to_string()),
            symbol: Some(symbol.to_string()),
            ask_price: Some("10.50".to_string()),
            ask_size: Some(100),
            bid_price: Some("10.40".to_string()),
            bid_size: Some(200),
            last_trade_price: Some("10.45".to_string()),
            last_extended_hours_trade_price: None,
            previous_close: Some("10.00".to_string()),
            has_traded: Some(true),
            trading_halted: Some(false),
            updated_at: Some("2018-06-29T20:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_instrument_id_from_url() {
        let url = "https://api.robinhood.com/instruments/ebab2398-028d-4939-9f1d-13bf38f81c50/";
        assert_eq!(
            instrument_id(url).as_deref(),
            Some("ebab2398-028d-4939-9f1d-13bf38f81c50")
        );
    }

    #[test]
    fn test_instrument_id_trailing_slash_insensitive() {
        let with_slash = instrument_id("https://api.robinhood.com/instruments/9/");
        let without_slash = instrument_id("https://api.robinhood.com/instruments/9");
        assert_eq!(with_slash.as_deref(), Some("9"));
        assert_eq!(with_slash, without_slash);
    }

    #[test]
    fn test_instrument_id_garbage() {
        assert_eq!(instrument_id("not a url"), None);
    }

    #[test]
    fn test_parse_updated_at() {
        let parsed = parse_updated_at(Some("2018-06-29T20:00:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2018-06-29T20:00:00+00:00");
        assert_eq!(parse_updated_at(None), None);
        assert_eq!(parse_updated_at(Some("yesterday")), None);
    }

    #[test]
    fn test_quote_records_drop_nulls() {
        let raw = vec![
            Some(raw_quote("https://api.robinhood.com/instruments/1/", "AAPL")),
            None,
            Some(raw_quote("https://api.robinhood.com/instruments/2/", "MSFT")),
            None,
        ];

        let records = quote_records(&raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].instrument_id, "1");
        assert_eq!(records[1].instrument_id, "2");
        assert_eq!(records[0].bid_price.as_deref(), Some("10.40"));
    }

    #[test]
    fn test_index_entries_cover_quotes_with_missing_fields() {
        let bare = RawQuote {
            instrument: Some("https://api.robinhood.com/instruments/3/".to_string()),
            symbol: None,
            ask_price: None,
            ask_size: None,
            bid_price: None,
            bid_size: None,
            last_trade_price: None,
            last_extended_hours_trade_price: None,
            previous_close: None,
            has_traded: Some(false),
            trading_halted: Some(true),
            updated_at: None,
        };
        let raw = vec![Some(bare), None];

        let entries = index_entries(&raw, Utc::now());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].instrument_id, "3");
        assert_eq!(entries[0].has_traded, Some(false));
        assert_eq!(entries[0].trading_halted, Some(true));
        assert_eq!(entries[0].updated_at, None);
    }

    #[test]
    fn test_popularity_fold_last_wins() {
        let entry = |id: &str, count: i64| {
            Some(RawPopularity {
                instrument: Some(format!("https://api.robinhood.com/instruments/{}/", id)),
                num_open_positions: Some(count),
            })
        };
        let raw = vec![entry("9", 7), entry("2", 3), entry("9", 11)];

        let counts = popularity_counts(&raw);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["9"], 11);
        assert_eq!(counts["2"], 3);
    }

    #[test]
    fn test_popularity_skips_incomplete_entries() {
        let raw = vec![
            Some(RawPopularity {
                instrument: None,
                num_open_positions: Some(1),
            }),
            Some(RawPopularity {
                instrument: Some("https://api.robinhood.com/instruments/5/".to_string()),
                num_open_positions: None,
            }),
            None,
        ];
        assert!(popularity_counts(&raw).is_empty());
    }
}
