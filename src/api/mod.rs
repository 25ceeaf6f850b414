//! Upstream brokerage API client

pub mod robinhood;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use types::{RawPopularity, RawQuote};

/// Response envelope shared by both read endpoints.
///
/// A well-formed success carries `results`; a throttled request carries a
/// human-readable `detail` instead. Individual result entries may be JSON
/// null, which the upstream emits for symbols it cannot currently price.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub results: Option<Vec<Option<T>>>,
    pub detail: Option<String>,
}

/// Read-only brokerage endpoints the pipeline depends on
#[async_trait]
pub trait BrokerageApi: Send + Sync {
    /// Fetch quotes for a comma-joined batch of ticker symbols
    async fn quotes(&self, symbols: &str) -> Result<Envelope<RawQuote>>;

    /// Fetch popularity counts for a comma-joined batch of instrument ids
    async fn popularity(&self, instrument_ids: &str) -> Result<Envelope<RawPopularity>>;
}
