//! Jot - Sinks
//!
//! Output destinations for the jot experiment logger. Every sink here
//! implements `jot_core::Sink` and is driven synchronously by the logger.
//!
//! # Available Sinks
//!
//! | Sink | Purpose | Payload |
//! |------|---------|---------|
//! | `console` | human-readable terminal output | entry |
//! | `jsonl` | JSON lines file | wire |
//! | `gzip` | gzip-compressed JSON lines file | wire |
//!
//! The `load` module reads either file format back, honoring the logger's
//! retention policy so a run can pick up where the last one stopped.
//!
//! # Example
//!
//! ```ignore
//! use jot_core::{Logger, Retention};
//! use jot_sinks::{ConsoleSink, GzipSink};
//!
//! let mut logger = Logger::new(Retention::Off)
//!     .with_sink(Box::new(ConsoleSink::new(Default::default())))
//!     .with_sink(Box::new(GzipSink::create("run.jsonl.gz")?));
//! ```

// =============================================================================
// Sink implementations (each in its own submodule)
// =============================================================================

/// Console sink - human-readable terminal output
pub mod console;

/// JSON lines sink - one serialized entry per line
pub mod jsonl;

/// Gzip sink - compressed JSON lines, crash-tolerant by appending members
pub mod gzip;

// =============================================================================
// Shared utilities
// =============================================================================

/// Reading log files back into a logger
pub mod load;

// =============================================================================
// Public re-exports
// =============================================================================

pub use console::{ConsoleConfig, ConsoleSink};
pub use gzip::GzipSink;
pub use jsonl::JsonlSink;
pub use load::{load, read_entries};

// Sinks reuse the core error type; a sink failure is a logging failure
pub use jot_core::{CoreError, Result};

// Tests are registered in their respective modules via #[cfg(test)]
// See: console/mod.rs, jsonl/mod.rs, gzip/mod.rs, load.rs
