//! Jot Remote - many-to-one entry aggregation
//!
//! A `Broker` collects entries from any number of `RemoteLogger` clients
//! into one local logger, tagging each entry with its origin. The broker
//! waits for the first client to join and finishes once every joined
//! client has left, then hands the logger back.
//!
//! # Protocol
//!
//! Every request is two frames `[payload, aux]`; every reply is a single
//! token frame. `aux` carries the session name on a join and is empty
//! otherwise.
//!
//! ```text
//! Client                          Broker
//!   │  [READY, name or empty]       │
//!   │ ─────────────────────────────>│  session opens
//!   │ <─────────────[READY]─────────│
//!   │  [entry, ""]                  │
//!   │ ─────────────────────────────>│  log(entry + remote_log tag)
//!   │ <─────────────[ACK]───────────│
//!   │  [DONE, ""]                   │
//!   │ ─────────────────────────────>│  session closes
//!   │ <─────────────[DONE]──────────│
//! ```
//!
//! A request that violates the protocol (an entry before joining, a
//! duplicate join, a malformed payload) closes that connection and
//! nothing else; the broker keeps serving the rest.

mod broker;
mod client;
mod error;

pub use broker::{Broker, BrokerConfig, SessionTag};
pub use client::RemoteLogger;
pub use error::RemoteError;

/// Result type for aggregation operations
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Queue depth for requests waiting on the broker loop
pub const SESSION_BUFFER: usize = 64;
