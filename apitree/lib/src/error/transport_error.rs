//! HTTP transport errors.

use thiserror::Error;

/// Failures delivering a request.
///
/// These are surfaced unchanged; the client never retries.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A header could not be placed on the wire.
    #[error("Invalid header {name:?}: {message}")]
    InvalidHeader {
        /// Header name as composed.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// Failed to establish a connection.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// Returns `true` if the underlying request timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}
