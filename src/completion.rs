//! Phase completion signaling
//!
//! The orchestrating process watches two shared flags to learn when each
//! fetch phase has drained its queue. Setting a flag is idempotent, so
//! duplicate sentinel deliveries from multiple workers are harmless.

use crate::error::Result;
use async_trait::async_trait;

/// Redis key flipped when the quote queue drains
const QUOTES_FINISHED_KEY: &str = "quotes:finished";

/// Redis key flipped when the popularity queue drains
const POPULARITY_FINISHED_KEY: &str = "popularity:finished";

/// Lock key the orchestrator holds across a fetch cycle; cleared on startup
const CACHE_LOCK_KEY: &str = "cache:locked";

/// Shared completion flags, one setter per mode
#[async_trait]
pub trait PhaseFlags: Send + Sync {
    async fn mark_quotes_done(&self) -> Result<()>;
    async fn mark_popularity_done(&self) -> Result<()>;
}

/// Redis-backed implementation of the shared flags
pub struct RedisPhaseFlags {
    client: redis::Client,
}

impl RedisPhaseFlags {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Clear the orchestrator's cache lock left over from a previous cycle
    pub async fn unlock_cache(&self) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("DEL").arg(CACHE_LOCK_KEY).query_async(&mut conn).await?;
        tracing::info!("Cleared cache lock");
        Ok(())
    }

    async fn set_flag(&self, key: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("SET").arg(key).arg("1").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl PhaseFlags for RedisPhaseFlags {
    async fn mark_quotes_done(&self) -> Result<()> {
        self.set_flag(QUOTES_FINISHED_KEY).await
    }

    async fn mark_popularity_done(&self) -> Result<()> {
        self.set_flag(POPULARITY_FINISHED_KEY).await
    }
}
