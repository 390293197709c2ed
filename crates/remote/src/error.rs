//! Aggregation error types

use std::io;

use jot_core::CoreError;
use jot_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while aggregating entries
#[derive(Debug, Error)]
pub enum RemoteError {
    /// I/O error on a socket
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed wire data
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The broker's local logger failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The broker answered with the wrong token
    #[error("handshake failed: expected {expected:?}, got {got:?}")]
    Handshake { expected: String, got: String },

    /// The broker closed the connection instead of answering
    #[error("broker closed the connection")]
    Rejected,

    /// The session was used after `close`
    #[error("session is closed")]
    Closed,
}
