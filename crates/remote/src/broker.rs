//! The aggregation broker
//!
//! One task owns the logger and the session table; connection tasks do
//! the socket work and forward each `[payload, aux]` request over a
//! channel, waiting for the reply token. The loop runs until every
//! session that ever joined has left, then returns the logger.
//!
//! # Design
//!
//! - the TCP connection is the session: one join per connection, and a
//!   connection that breaks the protocol is closed without touching the
//!   session table of the others
//! - named sessions tag their entries with the name, anonymous ones with
//!   an ordinal; ordinals count every join, named or not
//! - a logger failure is fatal: aggregated history would silently diverge
//!   from what clients believe was recorded

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use socket2::{SockRef, TcpKeepalive};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use jot_core::Logger;
use jot_protocol::{read_frame, write_frame, Entry, REMOTE_LOG_KEY};
use jot_protocol::{ACK, DEFAULT_AGGREGATE_PORT, DONE, READY};

use crate::{Result, SESSION_BUFFER};

/// Configuration for the aggregation broker
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Address the broker listens on
    pub listen_addr: SocketAddr,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_AGGREGATE_PORT)),
        }
    }
}

impl BrokerConfig {
    /// Set the listen address
    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }
}

/// How a session's entries are tagged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTag {
    /// The name the client joined with
    Named(String),
    /// Join ordinal for anonymous clients, starting at 1
    Ordinal(u64),
}

impl SessionTag {
    fn value(&self) -> Value {
        match self {
            SessionTag::Named(name) => Value::from(name.as_str()),
            SessionTag::Ordinal(n) => Value::from(*n),
        }
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTag::Named(name) => f.write_str(name),
            SessionTag::Ordinal(n) => write!(f, "#{n}"),
        }
    }
}

/// One `[payload, aux]` request forwarded by a connection task
struct SessionRequest {
    conn: u64,
    payload: Bytes,
    aux: Bytes,
    reply: oneshot::Sender<Reply>,
}

/// What the connection task should do with the request
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    /// Answer with this token and keep reading
    Token(&'static str),
    /// Close the connection without answering
    Drop,
}

/// Whether the broker loop keeps going
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Finished,
}

/// Collects entries from remote sessions into one logger
pub struct Broker {
    listener: TcpListener,
    listen_addr: SocketAddr,
    logger: Logger,
    cancel: CancellationToken,
}

impl Broker {
    /// Bind the listener
    ///
    /// Port 0 binds an ephemeral port, available from
    /// [`Broker::local_addr`] before `run`.
    pub async fn bind(config: BrokerConfig, logger: Logger) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr).await?;
        let listen_addr = listener.local_addr()?;
        info!(addr = %listen_addr, "aggregation broker listening");
        Ok(Self {
            listener,
            listen_addr,
            logger,
            cancel: CancellationToken::new(),
        })
    }

    /// Address the broker is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Token that stops `run` from outside the session protocol
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Serve sessions until every joined session has left
    ///
    /// Returns the logger, still open, with everything aggregated so far.
    /// Cancellation also returns the logger; a logger failure aborts the
    /// run with the error.
    pub async fn run(self) -> Result<Logger> {
        let Broker {
            listener,
            listen_addr: _,
            mut logger,
            cancel,
        } = self;

        let (request_tx, mut request_rx) = mpsc::channel::<SessionRequest>(SESSION_BUFFER);
        let mut sessions: HashMap<u64, SessionTag> = HashMap::new();
        let mut next_conn: u64 = 1;
        let mut next_ordinal: u64 = 1;
        let mut joined = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(open_sessions = sessions.len(), "broker cancelled");
                    break;
                }

                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let conn = next_conn;
                        next_conn += 1;
                        let requests = request_tx.clone();
                        let cancel = cancel.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_session(stream, conn, requests, cancel).await {
                                debug!(conn, peer = %addr, error = %e, "session connection ended");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept session"),
                },

                request = request_rx.recv() => {
                    // request_tx is held here, so the channel cannot close
                    let Some(request) = request else { break };
                    let flow = handle_request(
                        &mut logger,
                        &mut sessions,
                        &mut next_ordinal,
                        &mut joined,
                        request,
                    )?;
                    if matches!(flow, Flow::Finished) {
                        break;
                    }
                }
            }
        }

        Ok(logger)
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("listen_addr", &self.listen_addr)
            .field("logger", &self.logger)
            .finish()
    }
}

/// Apply one request against the session table and the logger
fn handle_request(
    logger: &mut Logger,
    sessions: &mut HashMap<u64, SessionTag>,
    next_ordinal: &mut u64,
    joined: &mut bool,
    request: SessionRequest,
) -> Result<Flow> {
    let SessionRequest {
        conn,
        payload,
        aux,
        reply,
    } = request;

    if payload.as_ref() == READY.as_bytes() {
        if sessions.contains_key(&conn) {
            warn!(conn, "duplicate join from live session");
            let _ = reply.send(Reply::Drop);
            return Ok(Flow::Continue);
        }
        let tag = if aux.is_empty() {
            SessionTag::Ordinal(*next_ordinal)
        } else {
            match std::str::from_utf8(&aux) {
                Ok(name) => SessionTag::Named(name.to_string()),
                Err(_) => {
                    warn!(conn, "join with non-UTF-8 name");
                    let _ = reply.send(Reply::Drop);
                    return Ok(Flow::Continue);
                }
            }
        };
        // Every join consumes an ordinal, named or not
        *next_ordinal += 1;
        info!(conn, session = %tag, "session joined");
        sessions.insert(conn, tag);
        *joined = true;
        let _ = reply.send(Reply::Token(READY));
        return Ok(Flow::Continue);
    }

    if payload.as_ref() == DONE.as_bytes() {
        let Some(tag) = sessions.remove(&conn) else {
            warn!(conn, "done from unknown session");
            let _ = reply.send(Reply::Drop);
            return Ok(Flow::Continue);
        };
        info!(conn, session = %tag, remaining = sessions.len(), "session left");
        let _ = reply.send(Reply::Token(DONE));
        if *joined && sessions.is_empty() {
            info!(entries = logger.len(), "last session left, broker finished");
            return Ok(Flow::Finished);
        }
        return Ok(Flow::Continue);
    }

    // Anything else is an entry from a joined session
    let Some(tag) = sessions.get(&conn) else {
        warn!(conn, "entry before join");
        let _ = reply.send(Reply::Drop);
        return Ok(Flow::Continue);
    };
    let parsed = std::str::from_utf8(&payload)
        .ok()
        .and_then(|text| Entry::from_wire(text).ok());
    let Some(mut entry) = parsed else {
        warn!(conn, session = %tag, "malformed entry payload");
        let _ = reply.send(Reply::Drop);
        return Ok(Flow::Continue);
    };
    entry.insert(REMOTE_LOG_KEY, tag.value());

    // A sink failure here is fatal for the whole broker
    logger.log(entry)?;
    let _ = reply.send(Reply::Token(ACK));
    Ok(Flow::Continue)
}

/// Socket options for a long-lived session connection
pub(crate) fn tune_stream(stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }
    let sock_ref = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(30))
        .with_interval(Duration::from_secs(30));
    if let Err(e) = sock_ref.set_tcp_keepalive(&keepalive) {
        debug!(error = %e, "failed to set TCP keepalive");
    }
}

/// Pump one connection's requests through the broker loop, in lockstep
async fn serve_session(
    mut stream: TcpStream,
    conn: u64,
    requests: mpsc::Sender<SessionRequest>,
    cancel: CancellationToken,
) -> Result<()> {
    tune_stream(&stream);
    loop {
        let payload = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = read_frame(&mut stream) => match frame? {
                Some(frame) => frame,
                None => break,
            },
        };
        let Some(aux) = read_frame(&mut stream).await? else {
            break;
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = SessionRequest {
            conn,
            payload,
            aux,
            reply: reply_tx,
        };
        if requests.send(request).await.is_err() {
            break;
        }
        match reply_rx.await {
            Ok(Reply::Token(token)) => write_frame(&mut stream, token.as_bytes()).await?,
            Ok(Reply::Drop) | Err(_) => break,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "broker_unit_test.rs"]
mod tests;
