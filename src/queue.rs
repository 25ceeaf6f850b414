//! Work queue consumption
//!
//! Thin dispatch loop over a Redis list, one channel per mode. BLPOP removes
//! the element on delivery, so acknowledgment is implicit: a crash mid-batch
//! loses that batch. Delivery semantics beyond that are the producer's
//! problem.

use crate::config::Mode;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Blocking consumer for one mode's channel
pub struct QueueConsumer {
    client: redis::Client,
    mode: Mode,
}

impl QueueConsumer {
    pub fn new(client: redis::Client, mode: Mode) -> Self {
        Self { client, mode }
    }

    /// Consume messages forever, one at a time, strictly sequentially
    pub async fn run(&self, pipeline: &Pipeline) -> Result<()> {
        let channel = self.mode.channel();
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        tracing::info!(channel, "Consuming work queue");

        loop {
            // 0 timeout = block until a message arrives
            let reply: Option<(String, String)> = redis::cmd("BLPOP")
                .arg(channel)
                .arg(0)
                .query_async(&mut conn)
                .await?;

            let Some((_, body)) = reply else {
                continue;
            };

            match self.mode {
                Mode::Quote => pipeline.handle_quotes(&body).await,
                Mode::Popularity => pipeline.handle_popularity(&body).await,
            }
        }
    }
}
