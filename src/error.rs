//! Error types for DocuBot
//!
//! This module defines the error taxonomy used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for DocuBot operations
///
/// Calls against the RAG service resolve to one of the transport, server,
/// upload or fetch variants. Validation and state-gate failures are raised
/// locally before any request is issued.
#[derive(Error, Debug)]
pub enum DocubotError {
    /// Transport failure (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status
    #[error("Server error: status={status}, {message}")]
    Server {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Input rejected before dispatch (empty query, non-PDF file)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document ingestion failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// Document listing failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Operation rejected because another one is still in flight
    #[error("Busy: {0}")]
    Busy(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DocubotError {
    /// Whether the error originated from talking to the service
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::error::DocubotError;
    ///
    /// assert!(DocubotError::Network("refused".to_string()).is_remote());
    /// assert!(!DocubotError::Validation("empty".to_string()).is_remote());
    /// ```
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Server { .. } | Self::Upload(_) | Self::Fetch(_)
        )
    }
}

/// Result type for calls against the RAG service and the client state machines
pub type ClientResult<T> = std::result::Result<T, DocubotError>;

/// Result type alias for application plumbing
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
