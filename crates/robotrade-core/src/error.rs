//! Error types for the trading engine.

use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Position storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Position not found")]
    NotFound,

    #[error("Invalid position id: {0}")]
    InvalidId(i64),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Price feed errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Can't subscribe to {ticker}: {reason}")]
    Connect { ticker: String, reason: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Can't parse tick: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
