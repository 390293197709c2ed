//! The streaming sink
//!
//! `StreamSink` is the producer side of the stream: a synchronous
//! `jot_core::Sink` that stamps sequence numbers and hands encoded
//! messages to the subscriber queues and the snapshot manager. Listener
//! tasks are spawned by `bind` and stop when the sink closes.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use jot_core::{CoreError, FilterSet, Payload, Retention, Sink};
use jot_protocol::{encode_message, ProtocolError, MAX_FRAME_SIZE};
use jot_protocol::{DEFAULT_BROADCAST_PORT, DEFAULT_SNAPSHOT_PORT};

use crate::registry::SubscriberRegistry;
use crate::snapshot::SnapshotManager;
use crate::{server, Result, QUERY_BUFFER};

/// Configuration for a streaming sink
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Address for the live broadcast listener
    pub broadcast_addr: SocketAddr,

    /// Address for the snapshot listener
    pub snapshot_addr: SocketAddr,

    /// How much history the snapshot side keeps
    ///
    /// `Retention::Off` disables the snapshot listener entirely.
    pub history: Retention,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            broadcast_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_BROADCAST_PORT)),
            snapshot_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_SNAPSHOT_PORT)),
            history: Retention::Unbounded,
        }
    }
}

impl StreamConfig {
    /// Create config that only broadcasts, keeping no history
    pub fn broadcast_only() -> Self {
        Self {
            history: Retention::Off,
            ..Self::default()
        }
    }

    /// Set the broadcast listener address
    #[must_use]
    pub fn with_broadcast_addr(mut self, addr: SocketAddr) -> Self {
        self.broadcast_addr = addr;
        self
    }

    /// Set the snapshot listener address
    #[must_use]
    pub fn with_snapshot_addr(mut self, addr: SocketAddr) -> Self {
        self.snapshot_addr = addr;
        self
    }

    /// Set the snapshot history policy
    #[must_use]
    pub fn with_history(mut self, history: Retention) -> Self {
        self.history = history;
        self
    }

    /// Whether this config serves snapshots
    pub fn serves_snapshots(&self) -> bool {
        self.history.capacity() != Some(0)
    }
}

/// Publishes entries live and feeds the snapshot history
pub struct StreamSink {
    seq: u64,
    registry: Arc<SubscriberRegistry>,
    updates: Option<mpsc::UnboundedSender<(u64, Arc<str>)>>,
    broadcast_addr: SocketAddr,
    snapshot_addr: Option<SocketAddr>,
    cancel: CancellationToken,
    filter: FilterSet,
}

impl StreamSink {
    /// Bind the listeners and spawn the serving tasks
    ///
    /// Requires a running tokio runtime. Port 0 binds an ephemeral port;
    /// the actual addresses are available from [`StreamSink::broadcast_addr`]
    /// and [`StreamSink::snapshot_addr`].
    pub async fn bind(config: StreamConfig) -> Result<Self> {
        let cancel = CancellationToken::new();
        let registry = Arc::new(SubscriberRegistry::new());

        let broadcast_listener = TcpListener::bind(config.broadcast_addr).await?;
        let broadcast_addr = broadcast_listener.local_addr()?;
        tokio::spawn(server::run_broadcast_listener(
            broadcast_listener,
            Arc::clone(&registry),
            cancel.clone(),
        ));

        let (snapshot_addr, updates) = if config.serves_snapshots() {
            let snapshot_listener = TcpListener::bind(config.snapshot_addr).await?;
            let addr = snapshot_listener.local_addr()?;
            let (update_tx, update_rx) = mpsc::unbounded_channel();
            let (query_tx, query_rx) = mpsc::channel(QUERY_BUFFER);
            tokio::spawn(
                SnapshotManager::new(config.history, update_rx, query_rx, cancel.clone()).run(),
            );
            tokio::spawn(server::run_snapshot_listener(
                snapshot_listener,
                query_tx,
                cancel.clone(),
            ));
            (Some(addr), Some(update_tx))
        } else {
            (None, None)
        };

        info!(
            broadcast = %broadcast_addr,
            snapshot = ?snapshot_addr,
            "stream sink listening"
        );

        Ok(Self {
            seq: 0,
            registry,
            updates,
            broadcast_addr,
            snapshot_addr,
            cancel,
            filter: FilterSet::new(),
        })
    }

    /// Attach a filter chain
    #[must_use]
    pub fn with_filter_set(mut self, filter: FilterSet) -> Self {
        self.filter = filter;
        self
    }

    /// Address of the live broadcast listener
    pub fn broadcast_addr(&self) -> SocketAddr {
        self.broadcast_addr
    }

    /// Address of the snapshot listener, when history is on
    pub fn snapshot_addr(&self) -> Option<SocketAddr> {
        self.snapshot_addr
    }

    /// Sequence number of the most recently published entry
    pub fn sequence(&self) -> u64 {
        self.seq
    }

    /// Number of connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

impl Sink for StreamSink {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn wants_wire(&self) -> bool {
        true
    }

    fn filter_set(&self) -> &FilterSet {
        &self.filter
    }

    fn emit(&mut self, payload: Payload<'_>) -> jot_core::Result<()> {
        let owned;
        let wire = match payload {
            Payload::Wire(wire) => wire,
            Payload::Entry(entry) => {
                owned = entry.to_wire()?;
                &owned
            }
        };
        if wire.len() > MAX_FRAME_SIZE {
            return Err(CoreError::from(ProtocolError::FrameTooLarge {
                len: wire.len(),
                max: MAX_FRAME_SIZE,
            }));
        }

        self.seq += 1;
        let seq_text = self.seq.to_string();
        let msg = encode_message(&[seq_text.as_bytes(), wire.as_bytes()]);

        let delivered = self.registry.broadcast(&msg);
        tracing::trace!(seq = self.seq, delivered, "entry broadcast");

        if let Some(updates) = &self.updates {
            updates
                .send((self.seq, Arc::from(wire)))
                .map_err(|_| CoreError::sink("stream", "snapshot manager is gone"))?;
        }
        Ok(())
    }

    fn close(&mut self) -> jot_core::Result<()> {
        self.cancel.cancel();
        self.updates = None;
        Ok(())
    }
}

impl Drop for StreamSink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink")
            .field("seq", &self.seq)
            .field("broadcast_addr", &self.broadcast_addr)
            .field("snapshot_addr", &self.snapshot_addr)
            .field("subscribers", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "publisher_test.rs"]
mod tests;
