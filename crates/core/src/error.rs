//! Core error types

use std::io;

use jot_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while dispatching entries
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error from a file-backed sink
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Wire encoding failed
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A sink rejected an entry or failed to shut down
    #[error("sink {name}: {message}")]
    Sink { name: &'static str, message: String },

    /// The logger was used after `close`
    #[error("logger is closed")]
    Closed,
}

impl CoreError {
    /// Create a sink error with the sink's registered name
    #[inline]
    pub fn sink(name: &'static str, message: impl Into<String>) -> Self {
        Self::Sink {
            name,
            message: message.into(),
        }
    }
}
