//! Error types for dogdo-store

use thiserror::Error;

/// Store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Timestamp could not be parsed or rendered
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The event store handle is not available
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// An update intent carried no event identifier
    #[error("event identifier is required for update")]
    MissingId,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
