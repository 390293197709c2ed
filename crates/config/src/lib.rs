//! jot configuration
//!
//! TOML-based configuration for the `jot` binary. Every section is optional;
//! an empty file yields a logger that pretty-prints to stdout and keeps no
//! history.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use jot_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[logger]\nretention = 500").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [logger]
//! retention = 500
//! file = "runs/today.jsonl.gz"
//!
//! [stream]
//! enabled = true
//! history = 1000
//!
//! [remote]
//! port = 5555
//! ```

mod error;
mod logger;
mod logging;
mod remote;
mod retention;
mod stream;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use logger::LoggerConfig;
pub use logging::{LogConfig, LogLevel};
pub use remote::RemoteConfig;
pub use retention::RetentionSpec;
pub use stream::StreamingConfig;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The CLI's own diagnostics
    pub log: LogConfig,

    /// Local sink stack (console, file, retention)
    pub logger: LoggerConfig,

    /// Live rebroadcast of aggregated entries
    pub stream: StreamingConfig,

    /// Aggregation broker listener
    pub remote: RemoteConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject port collisions among the listeners serve would bind
    fn validate(&self) -> Result<()> {
        if !self.stream.enabled {
            return Ok(());
        }
        let pairs = [
            (
                self.stream.broadcast_port,
                "stream.broadcast_port",
                self.stream.snapshot_port,
                "stream.snapshot_port",
            ),
            (
                self.stream.broadcast_port,
                "stream.broadcast_port",
                self.remote.port,
                "remote.port",
            ),
            (
                self.stream.snapshot_port,
                "stream.snapshot_port",
                self.remote.port,
                "remote.port",
            ),
        ];
        for (a, a_key, b, b_key) in pairs {
            if a == b {
                return Err(ConfigError::duplicate_port(a, a_key, b_key));
            }
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
