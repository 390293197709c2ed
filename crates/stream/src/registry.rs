//! Subscriber registry for the broadcast fan-out
//!
//! Each connected subscriber gets a bounded queue. `broadcast` hands a
//! cheap clone of the encoded message to every queue without ever
//! blocking: a full queue drops that message for that subscriber only.
//! The snapshot history is unaffected, so a subscriber that fell behind
//! can always resynchronize with a snapshot request.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

/// Maximum concurrent subscribers per stream
pub const MAX_SUBSCRIBERS: usize = 100;

/// Per-subscriber queue depth before messages drop
pub const SUBSCRIBER_BUFFER: usize = 256;

/// Subscriber ids are process-wide and never reused
static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// One connected subscriber
#[derive(Debug)]
struct Slot {
    id: u64,
    sender: mpsc::Sender<Bytes>,
}

/// Tracks connected subscribers and fans messages out to them
#[derive(Debug)]
pub(crate) struct SubscriberRegistry {
    slots: RwLock<Vec<Slot>>,
    dropped: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Register a subscriber, returning its id and the message feed
    ///
    /// Returns `None` once `MAX_SUBSCRIBERS` are connected.
    pub fn subscribe(&self) -> Option<(u64, mpsc::Receiver<Bytes>)> {
        let mut slots = self.slots.write();
        if slots.len() >= MAX_SUBSCRIBERS {
            return None;
        }
        let id = NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        slots.push(Slot { id, sender });
        Some((id, receiver))
    }

    /// Remove a subscriber
    pub fn unsubscribe(&self, id: u64) {
        self.slots.write().retain(|slot| slot.id != id);
    }

    /// Queue a message for every subscriber, returning how many took it
    pub fn broadcast(&self, msg: &Bytes) -> usize {
        let slots = self.slots.read();
        let mut sent = 0;
        for slot in slots.iter() {
            match slot.sender.try_send(msg.clone()) {
                Ok(()) => sent += 1,
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    trace!(id = slot.id, "subscriber queue full, message dropped");
                }
                // Connection task is tearing down; it unsubscribes itself
                Err(TrySendError::Closed(_)) => {}
            }
        }
        sent
    }

    /// Number of connected subscribers
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Total messages dropped across all subscribers
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
