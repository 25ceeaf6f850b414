//! Retry policy
//!
//! Pure mapping from a response classification to the action the pipeline
//! takes. All backoff durations live here. Transient classes retry without
//! an attempt cap; ambiguous and terminal classes abandon the batch so a
//! truly unexpected response shape can never loop forever.

use crate::classify::Classification;
use async_trait::async_trait;
use std::time::Duration;

/// Cooldown before retrying a timed-out or garbled fetch
const TRANSIENT_RETRY_SECONDS: u64 = 30;

/// Cooldown applied before giving up on an unclassifiable response
const UNKNOWN_COOLDOWN_SECONDS: u64 = 120;

/// What the pipeline does next with the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Persist the results, then apply the pacing delay
    Proceed,
    /// Sleep, then re-issue the identical batch
    RetryAfter(Duration),
    /// Sleep, then drop the batch
    AbandonAfter(Duration),
    /// Drop the batch immediately
    Abandon,
}

/// Decide the action for a classification
pub fn plan<T>(classification: &Classification<T>) -> RetryAction {
    match classification {
        Classification::Success(_) => RetryAction::Proceed,
        Classification::RateLimited(seconds) => {
            RetryAction::RetryAfter(Duration::from_secs_f64(*seconds))
        }
        Classification::Timeout | Classification::Malformed => {
            RetryAction::RetryAfter(Duration::from_secs(TRANSIENT_RETRY_SECONDS))
        }
        Classification::Unknown => {
            RetryAction::AbandonAfter(Duration::from_secs(UNKNOWN_COOLDOWN_SECONDS))
        }
        Classification::NotFound => RetryAction::Abandon,
    }
}

/// Injectable sleep so tests can observe cooldowns without waiting them out
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
