use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Binance client
#[derive(Error, Debug)]
pub enum BinanceError {
    /// HTTP request failed before a response was produced
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST API answered with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// JSON encoding/decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation required credentials that were not configured
    #[error("missing credential: {0}")]
    Credentials(&'static str),

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    Transport(String),

    /// Operation attempted while no connection is open
    #[error("WebSocket connection is closed")]
    ConnectionClosed,

    /// No reply arrived for a command within the configured window
    #[error("no reply for command {id} within the timeout")]
    CommandTimeout { id: u64 },

    /// The server pushed an error frame; fatal to the connection
    #[error("server error {code}: {msg}")]
    Server { code: i64, msg: String },

    /// A stream callback returned an error
    #[error("stream callback failed: {0}")]
    Callback(String),

    /// A reply arrived but did not have the expected shape
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Result type for Binance client operations
pub type Result<T> = std::result::Result<T, BinanceError>;
