//! The sink trait
//!
//! A sink is one output destination for logged entries: a terminal
//! printer, a JSON-lines file, a network publisher. Sinks are driven
//! synchronously by the logger in registration order.

use jot_protocol::Entry;

use crate::filter::FilterSet;
use crate::Result;

/// What a sink receives for one logged entry
///
/// Sinks that speak the wire format get the serialized line the logger
/// already produced; everything else gets the filtered entry.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// The filtered entry
    Entry(&'a Entry),
    /// The filtered entry's wire encoding
    Wire(&'a str),
}

impl<'a> Payload<'a> {
    /// The entry, when this payload carries one
    pub fn entry(&self) -> Option<&'a Entry> {
        match self {
            Payload::Entry(entry) => Some(entry),
            Payload::Wire(_) => None,
        }
    }

    /// The wire line, when this payload carries one
    pub fn wire(&self) -> Option<&'a str> {
        match self {
            Payload::Entry(_) => None,
            Payload::Wire(wire) => Some(wire),
        }
    }
}

/// One output destination
pub trait Sink: Send {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Whether this sink wants the serialized wire line instead of the
    /// entry itself
    fn wants_wire(&self) -> bool {
        false
    }

    /// The filter chain to run before this sink sees an entry
    fn filter_set(&self) -> &FilterSet {
        FilterSet::empty()
    }

    /// Handle one logged entry
    fn emit(&mut self, payload: Payload<'_>) -> Result<()>;

    /// Flush and release resources
    ///
    /// Called once by `Logger::close`; implementations are expected to
    /// tolerate repeat calls.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
