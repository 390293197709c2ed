//! Jot Stream - live broadcast and snapshot streaming
//!
//! Publishes logged entries over TCP as they happen and serves late
//! joiners a snapshot of everything so far, so a consumer can build the
//! complete sequence without gaps.
//!
//! # Design
//!
//! ```text
//!                    ┌────────────────────┐
//! Logger ──emit──>   │     StreamSink     │
//!                    └─────┬────────┬─────┘
//!        per-subscriber    │        │ unbounded updates
//!        queues (drop on   │        v
//!        full)             │   ┌──────────────────┐
//!                          │   │ snapshot manager │<── ICANHAZ? (5556)
//!                          v   └──────────────────┘
//!                   broadcast (5557)
//! ```
//!
//! - `emit` is synchronous: it stamps the next sequence number, encodes
//!   the `[sequence, entry]` message once, and hands cheap clones to each
//!   subscriber queue
//! - slow subscribers lose messages rather than stall the experiment;
//!   the snapshot channel never drops, keeping history complete
//! - the snapshot manager owns the history buffer; both listeners and the
//!   manager stop on one cancellation token
//!
//! # Wire Format
//!
//! Live traffic is a stream of `[sequence, entry]` messages. A snapshot
//! request is a single `ICANHAZ?` frame; the reply replays `[sequence,
//! entry]` pairs and ends with `["-1", "\"\""]`.

mod client;
mod error;
mod publisher;
mod registry;
mod server;
mod snapshot;

pub use client::{get_snapshot, Replay, Subscriber};
pub use error::StreamError;
pub use publisher::{StreamConfig, StreamSink};
pub use registry::{MAX_SUBSCRIBERS, SUBSCRIBER_BUFFER};

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;

/// Queue depth for pending snapshot requests
pub const QUERY_BUFFER: usize = 16;
