//! Live broadcast configuration

use jot_protocol::{DEFAULT_BROADCAST_PORT, DEFAULT_SNAPSHOT_PORT};
use serde::Deserialize;

use crate::RetentionSpec;

/// Rebroadcast settings for the serve command
///
/// When enabled, every aggregated entry is also published to live
/// subscribers, with an optional snapshot service for late joiners.
///
/// # Example
///
/// ```toml
/// [stream]
/// enabled = true
/// history = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Rebroadcast aggregated entries to live subscribers
    /// Default: false
    pub enabled: bool,

    /// Bind address for both stream listeners
    /// Default: "0.0.0.0"
    pub host: String,

    /// Port for the live broadcast listener
    /// Default: 5557
    pub broadcast_port: u16,

    /// Port for the snapshot request listener
    /// Default: 5556
    pub snapshot_port: u16,

    /// Entries the snapshot service keeps; "off" disables snapshots
    /// Default: "unbounded"
    pub history: RetentionSpec,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "0.0.0.0".into(),
            broadcast_port: DEFAULT_BROADCAST_PORT,
            snapshot_port: DEFAULT_SNAPSHOT_PORT,
            history: RetentionSpec::Unbounded,
        }
    }
}

impl StreamingConfig {
    /// `host:port` for the broadcast listener
    pub fn broadcast_addr(&self) -> String {
        format!("{}:{}", self.host, self.broadcast_port)
    }

    /// `host:port` for the snapshot listener
    pub fn snapshot_addr(&self) -> String {
        format!("{}:{}", self.host, self.snapshot_port)
    }
}
