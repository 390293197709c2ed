//! Local sink stack configuration

use serde::Deserialize;

use crate::RetentionSpec;

/// Sink stack assembled for the local logger
///
/// # Example
///
/// ```toml
/// [logger]
/// retention = 500
/// console = false
/// file = "runs/today.jsonl.gz"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// How many dispatched entries the logger keeps for indexing
    /// Default: "off"
    pub retention: RetentionSpec,

    /// Pretty-print entries to stdout
    /// Default: true
    pub console: bool,

    /// ANSI colors in console output
    /// Default: true
    pub color: bool,

    /// Write entries to this file; a `.gz` suffix selects the gzip sink
    /// Default: none
    pub file: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            retention: RetentionSpec::Off,
            console: true,
            color: true,
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.retention, RetentionSpec::Off);
        assert!(config.console);
        assert!(config.color);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_deserialize_empty() {
        let config: LoggerConfig = toml::from_str("").unwrap();
        assert!(config.console);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
retention = 200
file = "out.jsonl.gz"
"#;
        let config: LoggerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.retention, RetentionSpec::Last(200));
        assert_eq!(config.file.as_deref(), Some("out.jsonl.gz"));
        // Defaults still apply
        assert!(config.console);
        assert!(config.color);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
retention = "unbounded"
console = false
color = false
file = "out.jsonl"
"#;
        let config: LoggerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.retention, RetentionSpec::Unbounded);
        assert!(!config.console);
        assert!(!config.color);
        assert_eq!(config.file.as_deref(), Some("out.jsonl"));
    }
}
