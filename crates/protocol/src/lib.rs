//! Jot Protocol - Core wire types for the jot experiment logger
//!
//! This crate provides the types every other crate builds on:
//! - `Entry` - one structured log record, a key-ordered JSON object
//! - `Tensor` - fixed-width numeric arrays with a tagged JSON encoding
//! - frame helpers - 4-byte length-prefixed framing used by all wire traffic
//! - handshake tokens shared by the streaming and aggregation protocols
//!
//! # Wire Format
//!
//! Every frame on the wire is length-prefixed:
//!
//! ```text
//! ┌─────────────┬──────────────┐
//! │ 4 bytes     │ N bytes      │
//! │ length (BE) │ payload      │
//! └─────────────┴──────────────┘
//! ```
//!
//! Messages are short fixed sequences of frames. A broadcast message is
//! `[sequence, entry]`; a snapshot reply is zero or more `[sequence, entry]`
//! pairs followed by the `["-1", "\"\""]` terminal; an aggregation request
//! is `[payload, aux]` answered by a single token frame.

mod entry;
mod error;
mod frame;
mod tensor;

pub use entry::Entry;
pub use error::ProtocolError;
pub use frame::{
    encode_message, read_frame, read_text_frame, write_frame, write_message, MAX_FRAME_SIZE,
};
pub use tensor::{DType, Element, Tensor, NDARRAY_KEY};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Join token opening an aggregation session
pub const READY: &str = "READY";

/// Acknowledgement token for a relayed entry
pub const ACK: &str = "ACK";

/// Leave token closing an aggregation session
pub const DONE: &str = "DONE";

/// Request body a snapshot client must send
pub const SNAPSHOT_REQUEST: &str = "ICANHAZ?";

/// Sequence frame marking the end of a snapshot reply
pub const END_OF_SNAPSHOT: &str = "-1";

/// Entry frame carried by the end-of-snapshot message
pub const END_OF_SNAPSHOT_PAYLOAD: &str = "\"\"";

/// Key an aggregation broker adds to relayed entries to mark their origin
pub const REMOTE_LOG_KEY: &str = "remote_log";

/// Default port for the live broadcast stream
pub const DEFAULT_BROADCAST_PORT: u16 = 5557;

/// Default port for snapshot requests
pub const DEFAULT_SNAPSHOT_PORT: u16 = 5556;

/// Default port for the aggregation broker
pub const DEFAULT_AGGREGATE_PORT: u16 = 5555;
