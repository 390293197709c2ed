//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - two listeners share a port
    #[error("port {port} is used by both {first} and {second}")]
    DuplicatePort {
        /// The conflicting port
        port: u16,
        /// Config key of the first listener
        first: &'static str,
        /// Config key of the second listener
        second: &'static str,
    },
}

impl ConfigError {
    /// Create a DuplicatePort error
    pub fn duplicate_port(port: u16, first: &'static str, second: &'static str) -> Self {
        Self::DuplicatePort {
            port,
            first,
            second,
        }
    }
}
