//! Error types for tuql

use thiserror::Error;

/// Core error type for tuql operations
#[derive(Error, Debug)]
pub enum TuqlError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Driver-reported failure; the message is surfaced verbatim.
    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Count error: {0}")]
    Count(String),

    #[error("No primary key: {0}")]
    NoPrimaryKey(String),

    #[error("Resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TuqlError {
    /// Whether the failure leaves browsing usable with reduced metadata.
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::Count(_))
    }
}

/// Result type alias for tuql operations
pub type Result<T> = std::result::Result<T, TuqlError>;
