//! Worker configuration
//!
//! Parsed from command-line arguments with environment fallback. One worker
//! process serves exactly one mode; throughput scales by running more
//! processes against the same queue.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Which feed this worker consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Ticker symbol batches -> quote records
    Quote,
    /// Instrument id batches -> popularity counts
    Popularity,
}

impl Mode {
    /// Name of the queue channel this mode consumes from
    pub fn channel(&self) -> &'static str {
        match self {
            Mode::Quote => "quote",
            Mode::Popularity => "popularity",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.channel())
    }
}

/// Ingestion worker settings
#[derive(Debug, Clone, Parser)]
#[command(name = "ingest-worker", about = "Market data ingestion worker")]
pub struct WorkerConfig {
    /// Feed to consume
    #[arg(long, value_enum, default_value_t = Mode::Popularity)]
    pub mode: Mode,

    /// Queue endpoint host
    #[arg(long, default_value = "localhost", env = "REDIS_HOST")]
    pub redis_host: String,

    /// Queue endpoint port
    #[arg(long, default_value_t = 6379, env = "REDIS_PORT")]
    pub redis_port: u16,

    /// Path to the SQLite database file
    #[arg(long, default_value = "market-ingest.db", env = "DATABASE_PATH")]
    pub db_path: PathBuf,

    /// Pacing delay applied after each successful fetch, in seconds
    #[arg(long, default_value_t = 1.0)]
    pub worker_request_cooldown_seconds: f64,
}

impl WorkerConfig {
    /// Redis connection URL for the queue endpoint
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    /// Pacing delay as a Duration
    pub fn request_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.worker_request_cooldown_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_channels() {
        assert_eq!(Mode::Quote.channel(), "quote");
        assert_eq!(Mode::Popularity.channel(), "popularity");
    }

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::parse_from(["ingest-worker"]);
        assert_eq!(config.mode, Mode::Popularity);
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.worker_request_cooldown_seconds, 1.0);
        assert_eq!(config.redis_url(), "redis://localhost:6379/");
    }
}
