//! Smoke tests for the aggregation pipeline
//!
//! These assemble the same stack the serve command runs: an aggregation
//! broker feeding a local sink stack, with remote producers on one side
//! and file, history, and live-stream consumers on the other.

use std::future::Future;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use serde_json::json;
use tokio::time::{sleep, timeout};

use jot::{
    read_entries, Broker, BrokerConfig, Entry, Logger, LoggerBuilder, RemoteLogger, Replay,
    Retention, StreamConfig, StreamSink, Subscriber,
};
use jot_config::Config;

/// An unused loopback address; listeners report the bound port.
fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

/// Wraps a future in a timeout so a wedged pipeline fails the test
/// instead of hanging it.
async fn within<F: Future>(fut: F) -> F::Output {
    timeout(Duration::from_secs(5), fut)
        .await
        .expect("test timed out")
}

async fn wait_for_subscribers(sink: &StreamSink, n: usize) {
    within(async {
        while sink.subscriber_count() < n {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

fn entry(i: i64) -> Entry {
    let mut e = Entry::new();
    e.insert("iteration", i);
    e
}

#[tokio::test]
async fn test_aggregation_lands_in_file_and_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.jsonl");

    // The sink stack comes from a config file, like serve builds it
    let toml = format!(
        "[logger]\nconsole = false\nretention = 2\nfile = \"{}\"\n",
        path.display()
    );
    let config = Config::from_str(&toml).expect("parse config");

    let mut builder = LoggerBuilder::new()
        .console(config.logger.console)
        .retention(config.logger.retention.to_retention());
    if let Some(file) = config.logger.file.clone() {
        builder = builder.file(file);
    }
    let logger = builder.build().await.expect("assemble sink stack");

    let broker = Broker::bind(
        BrokerConfig {
            listen_addr: loopback(),
        },
        logger,
    )
    .await
    .expect("bind broker");
    let addr = broker.local_addr();
    let handle = tokio::spawn(broker.run());

    // Sessions overlap so the broker keeps running until both are done
    let mut alpha = within(RemoteLogger::connect(addr, Some("alpha")))
        .await
        .expect("join alpha");
    let mut beta = within(RemoteLogger::connect(addr, Some("beta")))
        .await
        .expect("join beta");

    within(alpha.log(&entry(1))).await.expect("log from alpha");
    within(beta.log(&entry(10))).await.expect("log from beta");
    within(alpha.log(&entry(2))).await.expect("log from alpha");
    within(alpha.close()).await.expect("close alpha");
    within(beta.close()).await.expect("close beta");

    let mut logger = within(handle).await.expect("join").expect("broker run");
    logger.close().expect("close sinks");

    // Retention kept the newest two of the three entries
    assert_eq!(logger.len(), 2);
    assert_eq!(logger[0].get("remote_log"), Some(&json!("beta")));
    assert_eq!(logger[1].get("iteration"), Some(&json!(2)));

    // The file saw every entry, tagged with its producer
    let read = read_entries(&path).expect("read back");
    assert_eq!(read.len(), 3);
    assert_eq!(read[0].get("remote_log"), Some(&json!("alpha")));
    assert_eq!(read[0].get("iteration"), Some(&json!(1)));
    assert_eq!(read[1].get("remote_log"), Some(&json!("beta")));
    assert_eq!(read[2].get("iteration"), Some(&json!(2)));
}

#[tokio::test]
async fn test_aggregation_rebroadcasts_live() {
    let sink = StreamSink::bind(StreamConfig::broadcast_only().with_broadcast_addr(loopback()))
        .await
        .expect("bind stream");
    let mut sub = within(Subscriber::connect(sink.broadcast_addr()))
        .await
        .expect("subscribe");
    wait_for_subscribers(&sink, 1).await;

    let logger = Logger::new(Retention::Off).with_sink(Box::new(sink));
    let broker = Broker::bind(
        BrokerConfig {
            listen_addr: loopback(),
        },
        logger,
    )
    .await
    .expect("bind broker");
    let addr = broker.local_addr();
    let handle = tokio::spawn(broker.run());

    let mut producer = within(RemoteLogger::connect(addr, Some("trainer")))
        .await
        .expect("join");
    within(producer.log(&entry(1))).await.expect("log");
    within(producer.log(&entry(2))).await.expect("log");

    let (seq, first) = within(sub.recv()).await.expect("recv").expect("stream open");
    assert_eq!(seq, 1);
    assert_eq!(first.get("iteration"), Some(&json!(1)));
    assert_eq!(first.get("remote_log"), Some(&json!("trainer")));

    let (seq, second) = within(sub.recv()).await.expect("recv").expect("stream open");
    assert_eq!(seq, 2);
    assert_eq!(second.get("iteration"), Some(&json!(2)));

    within(producer.close()).await.expect("close producer");
    let mut logger = within(handle).await.expect("join").expect("broker run");
    logger.close().expect("close sinks");

    // Closing the stack ends the broadcast for connected clients
    assert!(within(sub.recv()).await.expect("recv").is_none());
}

#[tokio::test]
async fn test_late_joiner_replays_history_then_live() {
    let sink = StreamSink::bind(
        StreamConfig::default()
            .with_broadcast_addr(loopback())
            .with_snapshot_addr(loopback())
            .with_history(Retention::Unbounded),
    )
    .await
    .expect("bind stream");
    let broadcast = sink.broadcast_addr();
    let snapshot = sink.snapshot_addr().expect("snapshot listener");

    let logger = Logger::new(Retention::Off).with_sink(Box::new(sink));
    let broker = Broker::bind(
        BrokerConfig {
            listen_addr: loopback(),
        },
        logger,
    )
    .await
    .expect("bind broker");
    let addr = broker.local_addr();
    let handle = tokio::spawn(broker.run());

    let mut producer = within(RemoteLogger::connect(addr, Some("trainer")))
        .await
        .expect("join");
    within(producer.log(&entry(1))).await.expect("log");
    within(producer.log(&entry(2))).await.expect("log");

    // Catch up mid-run, then keep listening
    let mut replay = within(Replay::start(Some(snapshot), broadcast))
        .await
        .expect("start replay");

    // Let the broadcast registration land before the next entry goes out
    sleep(Duration::from_millis(100)).await;
    within(producer.log(&entry(3))).await.expect("log");

    for i in 1i64..=3 {
        let received = within(replay.next()).await.expect("next").expect("stream open");
        assert_eq!(received.get("iteration"), Some(&json!(i)));
        assert_eq!(received.get("remote_log"), Some(&json!("trainer")));
    }

    within(producer.close()).await.expect("close producer");
    let mut logger = within(handle).await.expect("join").expect("broker run");
    logger.close().expect("close sinks");
}
