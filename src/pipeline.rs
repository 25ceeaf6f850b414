//! Per-message ingestion pipeline
//!
//! One invocation per delivered batch: short-circuit on the sentinel,
//! otherwise fetch-classify-act in an explicit loop until the batch either
//! persists or is abandoned. Nothing in here returns an error to the
//! dispatch loop; a poisoned message can cost us its batch but never the
//! worker.

use crate::api::BrokerageApi;
use crate::classify::{classify, Classification};
use crate::completion::PhaseFlags;
use crate::config::Mode;
use crate::db::Store;
use crate::error::Result;
use crate::normalize;
use crate::retry::{plan, RetryAction, Sleeper};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Terminal message a producer enqueues after the last real batch
pub const SENTINEL: &str = "__DONE";

/// Ingestion pipeline with its injected collaborators
pub struct Pipeline {
    api: Arc<dyn BrokerageApi>,
    store: Arc<Store>,
    flags: Arc<dyn PhaseFlags>,
    sleeper: Arc<dyn Sleeper>,
    request_cooldown: Duration,
}

impl Pipeline {
    pub fn new(
        api: Arc<dyn BrokerageApi>,
        store: Arc<Store>,
        flags: Arc<dyn PhaseFlags>,
        sleeper: Arc<dyn Sleeper>,
        request_cooldown: Duration,
    ) -> Self {
        Self {
            api,
            store,
            flags,
            sleeper,
            request_cooldown,
        }
    }

    /// Handle one message from the quote channel
    pub async fn handle_quotes(&self, body: &str) {
        if body == SENTINEL {
            self.complete_phase(Mode::Quote).await;
            return;
        }

        let Some(raw) = self
            .fetch_with_retry(Mode::Quote, || self.api.quotes(body))
            .await
        else {
            return;
        };

        let now = Utc::now();
        let entries = normalize::index_entries(&raw, now);
        let records = normalize::quote_records(&raw);
        tracing::debug!(
            batch = records.len(),
            index = entries.len(),
            "Storing quote batch"
        );

        self.store.store_quotes(&entries, &records);
        self.sleeper.sleep(self.request_cooldown).await;
    }

    /// Handle one message from the popularity channel
    pub async fn handle_popularity(&self, body: &str) {
        if body == SENTINEL {
            self.complete_phase(Mode::Popularity).await;
            return;
        }

        let Some(raw) = self
            .fetch_with_retry(Mode::Popularity, || self.api.popularity(body))
            .await
        else {
            return;
        };

        let counts = normalize::popularity_counts(&raw);
        tracing::debug!(batch = counts.len(), "Storing popularity batch");

        if let Err(e) = self.store.store_popularities(&counts) {
            tracing::error!("Popularity batch write failed: {}", e);
        }
        self.sleeper.sleep(self.request_cooldown).await;
    }

    /// Flip the mode-specific completion flag without touching the upstream
    async fn complete_phase(&self, mode: Mode) {
        tracing::info!(channel = mode.channel(), "phase_complete");
        let result = match mode {
            Mode::Quote => self.flags.mark_quotes_done().await,
            Mode::Popularity => self.flags.mark_popularity_done().await,
        };
        if let Err(e) = result {
            tracing::error!("Failed to mark {} phase finished: {}", mode, e);
        }
    }

    /// Fetch until the batch succeeds or the policy abandons it. Retries
    /// re-issue the identical batch; there is deliberately no attempt cap
    /// for transient classifications.
    async fn fetch_with_retry<T, F, Fut>(&self, mode: Mode, fetch: F) -> Option<Vec<Option<T>>>
    where
        T: std::fmt::Debug,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<crate::api::Envelope<T>>>,
    {
        loop {
            let classification = classify(fetch().await);
            log_classification(mode, &classification);

            match plan(&classification) {
                RetryAction::Proceed => {
                    if let Classification::Success(results) = classification {
                        return Some(results);
                    }
                    return None;
                }
                RetryAction::RetryAfter(cooldown) => {
                    self.sleeper.sleep(cooldown).await;
                }
                RetryAction::AbandonAfter(cooldown) => {
                    self.sleeper.sleep(cooldown).await;
                    return None;
                }
                RetryAction::Abandon => return None,
            }
        }
    }
}

/// One stable event name per classifier branch
fn log_classification<T>(mode: Mode, classification: &Classification<T>) {
    let channel = mode.channel();
    match classification {
        Classification::Success(results) => {
            tracing::debug!(channel, batch = results.len(), "fetch_succeeded");
        }
        Classification::RateLimited(seconds) => {
            tracing::warn!(channel, cooldown_seconds = seconds, "rate_limited");
        }
        Classification::Timeout => tracing::warn!(channel, "timeout"),
        Classification::Malformed => tracing::warn!(channel, "malformed"),
        Classification::Unknown => tracing::error!(channel, "unknown"),
        Classification::NotFound => tracing::warn!(channel, "not_found"),
    }
}
