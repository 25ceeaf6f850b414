//! Response classification
//!
//! Collapses every possible upstream outcome into one closed set of
//! classifications so the pipeline matches exhaustively instead of probing
//! response shapes. The retry policy in `retry` maps each classification to
//! an action.

use crate::api::Envelope;
use crate::error::{Result, WorkerError};

/// Every way an upstream fetch can turn out
#[derive(Debug)]
pub enum Classification<T> {
    /// Well-formed response; carries the raw result entries (nulls included)
    Success(Vec<Option<T>>),
    /// Throttled; cooldown in seconds parsed from the error detail
    RateLimited(f64),
    /// Request hit the network timeout or a transient transport failure
    Timeout,
    /// Response body was not valid structured data
    Malformed,
    /// The upstream does not recognize the requested symbols
    NotFound,
    /// Response shape matched nothing we expect
    Unknown,
}

/// Classify the outcome of an upstream call
pub fn classify<T: std::fmt::Debug>(outcome: Result<Envelope<T>>) -> Classification<T> {
    match outcome {
        Ok(envelope) => match (envelope.results, envelope.detail) {
            (Some(results), _) => Classification::Success(results),
            (None, Some(detail)) => match parse_cooldown(&detail) {
                Ok(seconds) => Classification::RateLimited(seconds),
                Err(_) => {
                    tracing::error!("Unexpected error detail from upstream: {:?}", detail);
                    Classification::Unknown
                }
            },
            (None, None) => {
                tracing::error!("Unexpected response from upstream: no results or error detail");
                Classification::Unknown
            }
        },
        Err(WorkerError::Timeout(_)) => Classification::Timeout,
        // Connection resets and refusals land here; same transient class
        Err(WorkerError::Http(_)) => Classification::Timeout,
        Err(WorkerError::MalformedPayload(_)) | Err(WorkerError::Serialization(_)) => {
            Classification::Malformed
        }
        Err(WorkerError::InvalidSymbol(_)) => Classification::NotFound,
        Err(err) => {
            tracing::error!("Unexpected error from upstream call: {}", err);
            Classification::Unknown
        }
    }
}

/// Parse a throttle phrase like "Request was throttled. Expected available in
/// 5 seconds." into a cooldown in seconds. Minutes are normalized to seconds.
pub fn parse_cooldown(detail: &str) -> Result<f64> {
    let tokens: Vec<&str> = detail
        .split_whitespace()
        .map(|t| t.trim_end_matches(['.', ',']))
        .collect();

    for pair in tokens.windows(2) {
        let Ok(value) = pair[0].parse::<f64>() else {
            continue;
        };
        let unit = pair[1].to_ascii_lowercase();
        if unit.starts_with("second") {
            return Ok(value);
        }
        if unit.starts_with("minute") {
            return Ok(value * 60.0);
        }
    }

    Err(WorkerError::MalformedCooldown(detail.to_string()))
}
