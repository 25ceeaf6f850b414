//! Worker error types

use thiserror::Error;

/// Worker-wide error type
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network timeout during {0} request")]
    Timeout(String),

    #[error("Malformed response payload: {0}")]
    MalformedPayload(String),

    #[error("Unrecognized symbols: {0}")]
    InvalidSymbol(String),

    #[error("Unparsable cooldown phrase: {0:?}")]
    MalformedCooldown(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
