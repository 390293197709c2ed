//! TCP listeners for the stream
//!
//! Two listeners, one task per connection. Broadcast connections are
//! write-only: the task forwards its registry queue to the socket and
//! watches for the peer closing. Snapshot connections are request-reply:
//! each `ICANHAZ?` frame is answered with the full history and the
//! `["-1", "\"\""]` terminal; anything else closes the connection.

use std::sync::Arc;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use jot_protocol::{read_frame, write_message, END_OF_SNAPSHOT, END_OF_SNAPSHOT_PAYLOAD};

use crate::registry::SubscriberRegistry;
use crate::snapshot::SnapshotQuery;
use crate::Result;

/// Keepalive probe interval for stream connections
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Apply socket options suited to a long-lived streaming connection
pub(crate) fn tune_stream(stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }
    let sock_ref = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_INTERVAL)
        .with_interval(KEEPALIVE_INTERVAL);
    if let Err(e) = sock_ref.set_tcp_keepalive(&keepalive) {
        debug!(error = %e, "failed to set TCP keepalive");
    }
}

// =============================================================================
// Broadcast side
// =============================================================================

pub(crate) async fn run_broadcast_listener(
    listener: TcpListener,
    registry: Arc<SubscriberRegistry>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&registry);
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_broadcast(stream, registry, cancel).await {
                            debug!(peer = %addr, error = %e, "broadcast connection ended");
                        }
                    });
                }
                Err(e) => error!(error = %e, "failed to accept broadcast connection"),
            },
        }
    }
    debug!("broadcast listener stopped");
}

async fn serve_broadcast(
    stream: TcpStream,
    registry: Arc<SubscriberRegistry>,
    cancel: CancellationToken,
) -> Result<()> {
    tune_stream(&stream);
    let Some((id, mut feed)) = registry.subscribe() else {
        warn!("subscriber limit reached, dropping connection");
        return Ok(());
    };
    debug!(id, "subscriber connected");

    let (mut reader, mut writer) = stream.into_split();
    let mut scratch = [0u8; 64];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            msg = feed.recv() => match msg {
                Some(msg) => {
                    if let Err(e) = writer.write_all(&msg).await {
                        debug!(id, error = %e, "subscriber write failed");
                        break;
                    }
                }
                None => break,
            },

            // The broadcast is one-way; reads only detect the peer leaving
            read = reader.read(&mut scratch) => match read {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            },
        }
    }

    registry.unsubscribe(id);
    debug!(id, "subscriber disconnected");
    Ok(())
}

// =============================================================================
// Snapshot side
// =============================================================================

pub(crate) async fn run_snapshot_listener(
    listener: TcpListener,
    queries: mpsc::Sender<SnapshotQuery>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let queries = queries.clone();
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_snapshot(stream, queries, cancel).await {
                            debug!(peer = %addr, error = %e, "snapshot connection ended");
                        }
                    });
                }
                Err(e) => error!(error = %e, "failed to accept snapshot connection"),
            },
        }
    }
    debug!("snapshot listener stopped");
}

async fn serve_snapshot(
    mut stream: TcpStream,
    queries: mpsc::Sender<SnapshotQuery>,
    cancel: CancellationToken,
) -> Result<()> {
    tune_stream(&stream);
    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = read_frame(&mut stream) => match frame? {
                Some(frame) => frame,
                None => break,
            },
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let query = SnapshotQuery {
            request,
            reply: reply_tx,
        };
        if queries.send(query).await.is_err() {
            break;
        }
        let Ok(reply) = reply_rx.await else { break };

        // A malformed request closes this connection; the manager is fine
        let Some(rows) = reply else { break };

        let count = rows.len();
        for (seq, wire) in &rows {
            write_message(&mut stream, &[seq.to_string().as_bytes(), wire.as_bytes()]).await?;
        }
        write_message(
            &mut stream,
            &[END_OF_SNAPSHOT.as_bytes(), END_OF_SNAPSHOT_PAYLOAD.as_bytes()],
        )
        .await?;
        debug!(entries = count, "snapshot served");
    }
    Ok(())
}
