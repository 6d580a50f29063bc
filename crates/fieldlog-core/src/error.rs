//! Error types for fieldlog-core

use thiserror::Error;

use crate::models::LogId;
use crate::transport::TransportError;

/// Result type alias using fieldlog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldlog-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Pull-phase fetch failed; nothing was merged
    #[error("Fetch failed: {0}")]
    Fetch(#[from] TransportError),

    /// No auth token is available, so nothing can be pushed
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Two local records claim the same server id
    #[error("Duplicate local log id: {0}")]
    DuplicateLogId(LogId),

    /// Record failed builder validation
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Intent addressed a record position that does not exist
    #[error("No local log at index {0}")]
    IndexOutOfRange(usize),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
