//! Error types for the coinbase-book crate.
//!
//! Book mutation only fails on malformed decimal strings. Everything else
//! here comes from the feed client and configuration.

use thiserror::Error;

use crate::types::fixed::ParseError;

/// The main error type for this crate
#[derive(Debug, Error)]
pub enum Error {
    /// Price or quantity string could not be decoded
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration (bad endpoint, no instruments)
    #[error("configuration error: {0}")]
    Config(String),

    /// Server rejected a command
    #[error("feed error: {0}")]
    Feed(String),

    /// WebSocket connection closed
    #[error("WebSocket connection closed")]
    ConnectionClosed,

    /// Connecting took longer than the configured timeout
    #[error("connection timed out")]
    Timeout,

    /// Instrument is not tracked by the manager
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid feed endpoint: {}", err))
    }
}
