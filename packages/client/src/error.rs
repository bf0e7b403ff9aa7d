//! Error types for the terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server URL cannot be used at all
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    /// The server refused the upgrade because it is full
    #[error("Server is at connection capacity")]
    CapacityExceeded,

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Reconnection attempts are exhausted
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),
}
