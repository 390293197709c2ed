//! jot: structured experiment logging
//!
//! A logger fans structured entries out to pluggable sinks: pretty-printed
//! console output, newline-delimited JSON files (optionally gzipped), a
//! sequence-numbered live broadcast with snapshot catch-up, and a
//! many-producers-to-one aggregation broker. This crate re-exports the
//! public surface of the component crates and adds [`LoggerBuilder`] for
//! assembling the standard sink stack.
//!
//! # Example
//!
//! ```no_run
//! use jot::{Entry, LoggerBuilder, Retention};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut logger = LoggerBuilder::new()
//!     .file("training.jsonl.gz")
//!     .retention(Retention::Last(100))
//!     .build()
//!     .await?;
//!
//! let mut entry = Entry::new();
//! entry.insert("iteration", 1);
//! entry.insert("training_error", 0.85);
//! logger.log(entry)?;
//!
//! logger.close()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;

pub use builder::LoggerBuilder;
pub use error::BuildError;

pub use jot_core::{
    filter_fn, CoreError, Filter, FilterSet, HistoryBuffer, Logger, Payload, Retention, Sink,
};
pub use jot_protocol::{DType, Element, Entry, ProtocolError, Tensor};
pub use jot_remote::{Broker, BrokerConfig, RemoteError, RemoteLogger, SessionTag};
pub use jot_sinks::{load, read_entries, ConsoleConfig, ConsoleSink, GzipSink, JsonlSink};
pub use jot_stream::{get_snapshot, Replay, StreamConfig, StreamError, StreamSink, Subscriber};
