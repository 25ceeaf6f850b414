//! Robinhood API adapter
//!
//! Both endpoints are public read endpoints; no session auth is required.
//! Transport failures are mapped onto the worker taxonomy here so the
//! classifier never has to inspect reqwest internals.

use crate::api::types::{RawPopularity, RawQuote};
use crate::api::{BrokerageApi, Envelope};
use crate::error::{Result, WorkerError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

const BASE_URL: &str = "https://api.robinhood.com";

/// Per-request network timeout; anything slower is retried by the pipeline.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Robinhood API client
pub struct RobinhoodClient {
    client: Client,
    base_url: String,
}

impl RobinhoodClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Client pointed at an alternate host (staging, local stub)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("market-ingest/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Map a transport error onto the worker taxonomy
    fn request_error(kind: &str, err: reqwest::Error) -> WorkerError {
        if err.is_timeout() {
            WorkerError::Timeout(kind.to_string())
        } else if err.is_decode() {
            // Non-JSON body, typically HTML from an upstream outage page
            WorkerError::MalformedPayload(err.to_string())
        } else {
            WorkerError::Http(err)
        }
    }
}

impl Default for RobinhoodClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerageApi for RobinhoodClient {
    async fn quotes(&self, symbols: &str) -> Result<Envelope<RawQuote>> {
        let url = format!("{}/quotes/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbols)])
            .send()
            .await
            .map_err(|e| Self::request_error("quote", e))?;

        // The quote endpoint rejects unrecognized symbols outright
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(WorkerError::InvalidSymbol(symbols.to_string()));
        }

        response
            .json()
            .await
            .map_err(|e| Self::request_error("quote", e))
    }

    async fn popularity(&self, instrument_ids: &str) -> Result<Envelope<RawPopularity>> {
        let url = format!("{}/instruments/popularity/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", instrument_ids)])
            .send()
            .await
            .map_err(|e| Self::request_error("popularity", e))?;

        response
            .json()
            .await
            .map_err(|e| Self::request_error("popularity", e))
    }
}
