//! Tests for StreamConfig

use jot_core::Retention;
use jot_protocol::{DEFAULT_BROADCAST_PORT, DEFAULT_SNAPSHOT_PORT};

use super::StreamConfig;

#[test]
fn test_default_config() {
    let config = StreamConfig::default();
    assert_eq!(config.broadcast_addr.port(), DEFAULT_BROADCAST_PORT);
    assert_eq!(config.snapshot_addr.port(), DEFAULT_SNAPSHOT_PORT);
    assert_eq!(config.history, Retention::Unbounded);
    assert!(config.serves_snapshots());
}

#[test]
fn test_broadcast_only_disables_snapshots() {
    let config = StreamConfig::broadcast_only();
    assert_eq!(config.history, Retention::Off);
    assert!(!config.serves_snapshots());
}

#[test]
fn test_zero_capacity_history_disables_snapshots() {
    let config = StreamConfig::default().with_history(Retention::Last(0));
    assert!(!config.serves_snapshots());
}

#[test]
fn test_builders() {
    let config = StreamConfig::default()
        .with_broadcast_addr("127.0.0.1:9000".parse().unwrap())
        .with_snapshot_addr("127.0.0.1:9001".parse().unwrap())
        .with_history(Retention::Last(16));

    assert_eq!(config.broadcast_addr.port(), 9000);
    assert_eq!(config.snapshot_addr.port(), 9001);
    assert_eq!(config.history, Retention::Last(16));
    assert!(config.serves_snapshots());
}
