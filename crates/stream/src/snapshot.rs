//! The snapshot manager
//!
//! A single task owns the history buffer. Publishers push `(sequence,
//! wire)` rows over an unbounded channel; connection tasks ask for the
//! full history with a `SnapshotQuery`. The select loop is biased toward
//! updates, so every row published before a query arrived is in the
//! history the query sees.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use jot_core::{HistoryBuffer, Retention};
use jot_protocol::SNAPSHOT_REQUEST;

/// One snapshot request from a connection task
///
/// `reply` carries the history rows, or `None` when the request frame was
/// not the expected token and the connection should close.
pub(crate) struct SnapshotQuery {
    pub request: Bytes,
    pub reply: oneshot::Sender<Option<Vec<(u64, Arc<str>)>>>,
}

/// Owns the history and answers snapshot queries
pub(crate) struct SnapshotManager {
    history: HistoryBuffer<(u64, Arc<str>)>,
    updates: mpsc::UnboundedReceiver<(u64, Arc<str>)>,
    queries: mpsc::Receiver<SnapshotQuery>,
    cancel: CancellationToken,
}

impl SnapshotManager {
    pub fn new(
        retention: Retention,
        updates: mpsc::UnboundedReceiver<(u64, Arc<str>)>,
        queries: mpsc::Receiver<SnapshotQuery>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            history: HistoryBuffer::new(retention),
            updates,
            queries,
            cancel,
        }
    }

    pub async fn run(mut self) {
        let mut updates_open = true;
        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                update = self.updates.recv(), if updates_open => match update {
                    Some(row) => self.history.push(row),
                    None => updates_open = false,
                },

                query = self.queries.recv() => match query {
                    Some(query) => self.answer(query),
                    None => break,
                },
            }
        }
        debug!(rows = self.history.len(), "snapshot manager stopped");
    }

    fn answer(&self, query: SnapshotQuery) {
        if query.request.as_ref() != SNAPSHOT_REQUEST.as_bytes() {
            warn!(request = ?query.request, "unexpected snapshot request");
            let _ = query.reply.send(None);
            return;
        }
        let rows: Vec<(u64, Arc<str>)> = self.history.iter().cloned().collect();
        let _ = query.reply.send(Some(rows));
    }
}
