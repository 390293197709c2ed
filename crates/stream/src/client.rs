//! Stream consumers
//!
//! Three ways to read a stream, from lowest to highest level:
//! - [`get_snapshot`] - one-shot request for everything logged so far
//! - [`Subscriber`] - live `[sequence, entry]` messages as they happen
//! - [`Replay`] - snapshot followed by live, duplicates removed, for
//!   consumers that want the complete sequence

use std::collections::VecDeque;
use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::debug;

use jot_protocol::{read_text_frame, write_frame, Entry, SNAPSHOT_REQUEST};

use crate::error::StreamError;
use crate::server::tune_stream;
use crate::Result;

/// Fetch everything logged so far
///
/// Returns the sequence number of the newest returned entry and the
/// entries, oldest first. An empty stream returns `(0, [])`.
pub async fn get_snapshot(addr: SocketAddr) -> Result<(u64, Vec<Entry>)> {
    let mut stream = TcpStream::connect(addr).await?;
    tune_stream(&stream);
    write_frame(&mut stream, SNAPSHOT_REQUEST.as_bytes()).await?;

    let mut sequence = 0u64;
    let mut entries = Vec::new();
    loop {
        let seq_text = read_text_frame(&mut stream)
            .await?
            .ok_or(StreamError::Truncated)?;
        let payload = read_text_frame(&mut stream)
            .await?
            .ok_or(StreamError::Truncated)?;

        let seq: i64 = seq_text
            .parse()
            .map_err(|_| StreamError::BadSequence(seq_text.clone()))?;
        if seq < 0 {
            break;
        }
        sequence = seq as u64;
        entries.push(Entry::from_wire(&payload)?);
    }

    debug!(sequence, entries = entries.len(), "snapshot received");
    Ok((sequence, entries))
}

/// A live broadcast connection
#[derive(Debug)]
pub struct Subscriber {
    stream: TcpStream,
}

impl Subscriber {
    /// Connect to a broadcast listener
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        tune_stream(&stream);
        Ok(Self { stream })
    }

    /// Receive the next `[sequence, entry]` message
    ///
    /// Returns `None` when the publisher closes the stream.
    pub async fn recv(&mut self) -> Result<Option<(u64, Entry)>> {
        let Some(seq_text) = read_text_frame(&mut self.stream).await? else {
            return Ok(None);
        };
        let payload = read_text_frame(&mut self.stream)
            .await?
            .ok_or(StreamError::Truncated)?;

        let seq: u64 = seq_text
            .parse()
            .map_err(|_| StreamError::BadSequence(seq_text.clone()))?;
        Ok(Some((seq, Entry::from_wire(&payload)?)))
    }
}

/// The complete entry sequence: snapshot first, then live
///
/// Subscribes to the live broadcast before fetching the snapshot, so no
/// entry can fall between the two. Live entries already covered by the
/// snapshot are dropped by sequence number.
#[derive(Debug)]
pub struct Replay {
    pending: VecDeque<Entry>,
    subscriber: Subscriber,
    watermark: u64,
}

impl Replay {
    /// Connect and fetch the initial snapshot
    ///
    /// Pass `None` for `snapshot_addr` to replay live entries only.
    pub async fn start(
        snapshot_addr: Option<SocketAddr>,
        broadcast_addr: SocketAddr,
    ) -> Result<Self> {
        let subscriber = Subscriber::connect(broadcast_addr).await?;
        let (watermark, entries) = match snapshot_addr {
            Some(addr) => get_snapshot(addr).await?,
            None => (0, Vec::new()),
        };
        debug!(watermark, replayed = entries.len(), "replay started");
        Ok(Self {
            pending: entries.into(),
            subscriber,
            watermark,
        })
    }

    /// The next entry in sequence order
    ///
    /// Returns `None` when the publisher closes the stream.
    pub async fn next(&mut self) -> Result<Option<Entry>> {
        if let Some(entry) = self.pending.pop_front() {
            return Ok(Some(entry));
        }
        loop {
            match self.subscriber.recv().await? {
                None => return Ok(None),
                Some((seq, entry)) if seq > self.watermark => return Ok(Some(entry)),
                // Already delivered as part of the snapshot
                Some(_) => continue,
            }
        }
    }
}
