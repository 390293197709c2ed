//! Stream error types

use std::io;

use jot_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while streaming entries
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error on a socket
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed wire data
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Peer closed the stream in the middle of a reply
    #[error("stream closed before the end of the reply")]
    Truncated,

    /// A sequence frame did not hold a decimal number
    #[error("bad sequence frame: {0:?}")]
    BadSequence(String),
}
