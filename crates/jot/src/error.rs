//! Facade error type

use jot_core::CoreError;
use jot_stream::StreamError;
use thiserror::Error;

/// Errors from assembling a logger with [`LoggerBuilder`](crate::LoggerBuilder)
#[derive(Debug, Error)]
pub enum BuildError {
    /// A file sink could not be created
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The streaming sink could not bind its listeners
    #[error(transparent)]
    Stream(#[from] StreamError),
}
