//! Tests for logger assembly

use serde_json::json;
use tempfile::tempdir;

use jot_core::Retention;
use jot_protocol::Entry;
use jot_sinks::read_entries;
use jot_stream::StreamConfig;

use super::LoggerBuilder;

fn entry(i: i64) -> Entry {
    let mut entry = Entry::new();
    entry.insert("iteration", i);
    entry
}

#[tokio::test]
async fn test_default_stack_is_console_only() {
    let logger = LoggerBuilder::new().build().await.expect("build");
    assert_eq!(logger.sink_count(), 1);
}

#[tokio::test]
async fn test_plain_file_stack() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("run.jsonl");

    let mut logger = LoggerBuilder::new()
        .file(&path)
        .console(false)
        .build()
        .await
        .expect("build");
    assert_eq!(logger.sink_count(), 1);

    logger.log(entry(1)).expect("log");
    logger.log(entry(2)).expect("log");
    logger.close().expect("close");

    let read = read_entries(&path).expect("read back");
    assert_eq!(read.len(), 2);
    assert_eq!(read[1].get("iteration"), Some(&json!(2)));
}

#[tokio::test]
async fn test_gz_suffix_selects_gzip_sink() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("run.jsonl.gz");

    let mut logger = LoggerBuilder::new()
        .file(&path)
        .console(false)
        .build()
        .await
        .expect("build");

    logger.log(entry(7)).expect("log");
    logger.close().expect("close");

    let read = read_entries(&path).expect("read back");
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].get("iteration"), Some(&json!(7)));
}

#[tokio::test]
async fn test_retention_bound_applies() {
    let mut logger = LoggerBuilder::new()
        .console(false)
        .retention(Retention::Last(2))
        .build()
        .await
        .expect("build");

    for i in 1..=5 {
        logger.log(entry(i)).expect("log");
    }
    assert_eq!(logger.len(), 2);
    assert_eq!(logger[0].get("iteration"), Some(&json!(4)));
    assert_eq!(logger[1].get("iteration"), Some(&json!(5)));
}

#[tokio::test]
async fn test_stream_stack_binds() {
    let config = StreamConfig::broadcast_only()
        .with_broadcast_addr("127.0.0.1:0".parse().expect("addr"));
    let mut logger = LoggerBuilder::new()
        .console(false)
        .stream(config)
        .build()
        .await
        .expect("build");
    assert_eq!(logger.sink_count(), 1);
    logger.close().expect("close");
}
