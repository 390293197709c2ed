//! Aggregation broker configuration

use jot_protocol::DEFAULT_AGGREGATE_PORT;
use serde::Deserialize;

/// Broker listener settings for the serve command
///
/// # Example
///
/// ```toml
/// [remote]
/// port = 6555
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Bind address for the broker listener
    /// Default: "0.0.0.0"
    pub host: String,

    /// Port the broker listens on
    /// Default: 5555
    pub port: u16,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_AGGREGATE_PORT,
        }
    }
}

impl RemoteConfig {
    /// `host:port` for the broker listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
