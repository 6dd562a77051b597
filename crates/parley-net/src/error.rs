use thiserror::Error;

use tokio_tungstenite::tungstenite;

/// Errors produced by the connection layer.
#[derive(Error, Debug)]
pub enum NetError {
    /// A send was attempted before registration completed (or after
    /// teardown).
    #[error("Not connected: no registered connection")]
    NotConnected,

    /// The connection attempt did not complete within the configured
    /// timeout.
    #[error("Connection attempt timed out")]
    Timeout,

    /// Transport-level failure while connecting or transmitting.
    #[error("Transport failure: {0}")]
    Transport(#[from] tungstenite::Error),

    /// The connection task has terminated and can accept no commands.
    #[error("Connection closed")]
    Closed,

    /// A frame could not be encoded.
    #[error("Frame encoding error: {0}")]
    Codec(#[from] serde_json::Error),
}
