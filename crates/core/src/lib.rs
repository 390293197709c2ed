//! Jot Core - sink dispatch, filtering, and retention
//!
//! This crate holds the synchronous heart of the logger:
//! - `Logger` - fans each entry out to an ordered list of sinks and keeps
//!   an optional in-memory history
//! - `Sink` - the trait every output destination implements
//! - `FilterSet` - an ordered chain of entry transforms with an identity
//!   used to share work between sinks
//! - `HistoryBuffer` / `Retention` - bounded FIFO retention
//!
//! # Design
//!
//! - Filtering and serialization happen once per distinct filter set per
//!   `log` call, no matter how many sinks share it
//! - All filtering and serialization for a call completes before the first
//!   sink emits, so a bad entry fails the call without partial delivery
//! - Sinks that speak the wire format receive the serialized line; the
//!   rest receive the filtered entry

mod error;
mod filter;
mod logger;
mod sink;
mod store;

pub use error::CoreError;
pub use filter::{filter_fn, Filter, FilterSet};
pub use logger::Logger;
pub use sink::{Payload, Sink};
pub use store::{HistoryBuffer, Retention};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

// Test modules - only compiled during testing
#[cfg(test)]
mod filter_test;
