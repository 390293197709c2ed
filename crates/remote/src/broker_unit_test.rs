//! Tests for the broker's request handling

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::json;
use tokio::sync::oneshot;

use jot_core::{CoreError, Logger, Payload, Retention, Sink};
use jot_protocol::{ACK, DONE, READY};

use super::{handle_request, Flow, Reply, SessionRequest, SessionTag};

/// Broker loop state plus a synchronous way to push one request through
struct Table {
    logger: Logger,
    sessions: HashMap<u64, SessionTag>,
    next_ordinal: u64,
    joined: bool,
}

impl Table {
    fn new() -> Self {
        Self {
            logger: Logger::new(Retention::Unbounded),
            sessions: HashMap::new(),
            next_ordinal: 1,
            joined: false,
        }
    }

    fn push(&mut self, conn: u64, payload: &[u8], aux: &[u8]) -> (Flow, Reply) {
        let (reply_tx, mut reply_rx) = oneshot::channel();
        let request = SessionRequest {
            conn,
            payload: Bytes::copy_from_slice(payload),
            aux: Bytes::copy_from_slice(aux),
            reply: reply_tx,
        };
        let flow = handle_request(
            &mut self.logger,
            &mut self.sessions,
            &mut self.next_ordinal,
            &mut self.joined,
            request,
        )
        .unwrap();
        let reply = reply_rx.try_recv().unwrap();
        (flow, reply)
    }

    fn join(&mut self, conn: u64, name: &str) -> Reply {
        self.push(conn, READY.as_bytes(), name.as_bytes()).1
    }

    fn entry(&mut self, conn: u64, wire: &str) -> Reply {
        self.push(conn, wire.as_bytes(), b"").1
    }

    fn done(&mut self, conn: u64) -> (Flow, Reply) {
        self.push(conn, DONE.as_bytes(), b"")
    }
}

// =============================================================================
// Join tests
// =============================================================================

#[test]
fn test_named_join_tags_entries_with_name() {
    let mut table = Table::new();
    assert_eq!(table.join(1, "alice"), Reply::Token(READY));
    assert_eq!(table.entry(1, r#"{"x":1}"#), Reply::Token(ACK));

    let logged = &table.logger[0];
    assert_eq!(logged.get("x"), Some(&json!(1)));
    assert_eq!(logged.get("remote_log"), Some(&json!("alice")));

    // The origin tag lands after the client's own keys
    let keys: Vec<&str> = logged.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["x", "remote_log"]);
}

#[test]
fn test_anonymous_joins_get_ordinals() {
    let mut table = Table::new();
    table.join(1, "");
    table.join(2, "");

    table.entry(1, "{}");
    table.entry(2, "{}");

    assert_eq!(table.logger[0].get("remote_log"), Some(&json!(1)));
    assert_eq!(table.logger[1].get("remote_log"), Some(&json!(2)));
}

#[test]
fn test_named_join_still_consumes_an_ordinal() {
    let mut table = Table::new();
    table.join(1, "alice");
    table.join(2, "");

    table.entry(2, "{}");
    assert_eq!(table.logger[0].get("remote_log"), Some(&json!(2)));
}

#[test]
fn test_duplicate_join_drops_connection_but_keeps_session() {
    let mut table = Table::new();
    table.join(1, "alice");
    assert_eq!(table.join(1, "alice"), Reply::Drop);

    // The original session still works
    assert_eq!(table.entry(1, "{}"), Reply::Token(ACK));
}

// =============================================================================
// Violation tests
// =============================================================================

#[test]
fn test_entry_before_join_dropped() {
    let mut table = Table::new();
    assert_eq!(table.entry(1, r#"{"x":1}"#), Reply::Drop);
    assert!(table.logger.is_empty());
}

#[test]
fn test_done_from_unknown_session_dropped() {
    let mut table = Table::new();
    let (flow, reply) = table.done(1);
    assert_eq!(flow, Flow::Continue);
    assert_eq!(reply, Reply::Drop);
}

#[test]
fn test_malformed_entry_dropped() {
    let mut table = Table::new();
    table.join(1, "");

    assert_eq!(table.entry(1, "not json"), Reply::Drop);
    assert_eq!(table.push(1, &[0xff, 0xfe], b"").1, Reply::Drop);
    assert!(table.logger.is_empty());
}

struct FailingSink;

impl Sink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn emit(&mut self, _payload: Payload<'_>) -> jot_core::Result<()> {
        Err(CoreError::sink("failing", "emit failed"))
    }
}

#[test]
fn test_logger_failure_is_fatal() {
    let mut table = Table::new();
    table.logger.add_sink(Box::new(FailingSink));
    table.join(1, "a");

    let (reply_tx, _reply_rx) = oneshot::channel();
    let request = SessionRequest {
        conn: 1,
        payload: Bytes::from_static(b"{}"),
        aux: Bytes::new(),
        reply: reply_tx,
    };
    let result = handle_request(
        &mut table.logger,
        &mut table.sessions,
        &mut table.next_ordinal,
        &mut table.joined,
        request,
    );
    assert!(result.is_err());
}

#[test]
fn test_client_supplied_remote_log_is_overwritten() {
    let mut table = Table::new();
    table.join(1, "alice");
    table.entry(1, r#"{"remote_log":"forged","x":1}"#);

    assert_eq!(table.logger[0].get("remote_log"), Some(&json!("alice")));
}

// =============================================================================
// Termination tests
// =============================================================================

#[test]
fn test_finishes_when_last_session_leaves() {
    let mut table = Table::new();
    table.join(1, "a");
    table.join(2, "b");

    let (flow, reply) = table.done(1);
    assert_eq!(flow, Flow::Continue);
    assert_eq!(reply, Reply::Token(DONE));

    let (flow, reply) = table.done(2);
    assert_eq!(flow, Flow::Finished);
    assert_eq!(reply, Reply::Token(DONE));
}

#[test]
fn test_single_session_finishes_on_its_own_done() {
    let mut table = Table::new();
    table.join(1, "a");
    let (flow, _) = table.done(1);
    assert_eq!(flow, Flow::Finished);
}
