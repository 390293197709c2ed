//! Protocol error types
//!
//! Errors that can occur when encoding or decoding wire data.

use std::io;

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed frame or message
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Frame length prefix exceeds the allowed maximum
    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    /// Entry could not be serialized or parsed
    #[error("entry encoding error: {0}")]
    Entry(#[from] serde_json::Error),

    /// Tagged numeric array payload could not be decoded
    #[error("array encoding error: {0}")]
    Array(String),

    /// Peer closed the connection in the middle of a message
    #[error("connection closed mid-message")]
    ConnectionClosed,
}

impl ProtocolError {
    /// Create a protocol error from any message
    #[inline]
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create an array encoding error
    #[inline]
    pub fn array(msg: impl Into<String>) -> Self {
        Self::Array(msg.into())
    }
}
