//! Market data ingestion worker
//!
//! Consumes symbol/instrument-id batches from a work queue, fetches quotes
//! or popularity counts from the upstream brokerage API, and persists
//! normalized rows into SQLite. One process serves one mode; scale-out is
//! more processes on the same queue.

pub mod api;
pub mod classify;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod queue;
pub mod retry;

use crate::api::robinhood::RobinhoodClient;
use crate::completion::RedisPhaseFlags;
use crate::config::WorkerConfig;
use crate::db::Store;
use crate::pipeline::Pipeline;
use crate::queue::QueueConsumer;
use crate::retry::TokioSleeper;
use std::sync::Arc;

/// Wire up collaborators and run the consumer loop until the process dies
pub async fn run(config: WorkerConfig) -> anyhow::Result<()> {
    tracing::info!(mode = %config.mode, "Starting ingestion worker");

    let store = Arc::new(Store::open(&config.db_path)?);
    let api = Arc::new(RobinhoodClient::new());
    let redis_client = redis::Client::open(config.redis_url())?;
    let flags = Arc::new(RedisPhaseFlags::new(redis_client.clone()));

    // Clear any lock the orchestrator left behind from a previous cycle
    flags.unlock_cache().await?;

    let pipeline = Pipeline::new(
        api,
        store,
        flags,
        Arc::new(TokioSleeper),
        config.request_cooldown(),
    );

    let consumer = QueueConsumer::new(redis_client, config.mode);
    consumer.run(&pipeline).await?;

    Ok(())
}
