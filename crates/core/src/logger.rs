//! The logger
//!
//! `Logger` owns an ordered list of sinks and an optional in-memory
//! history. Each `log` call runs every distinct filter set once, serializes
//! once for the sinks that want the wire form, then emits to the sinks in
//! registration order.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use jot_protocol::Entry;

use crate::error::CoreError;
use crate::sink::{Payload, Sink};
use crate::store::{HistoryBuffer, Retention};
use crate::Result;

/// Fans logged entries out to sinks and keeps bounded history
pub struct Logger {
    sinks: Vec<Box<dyn Sink>>,
    history: HistoryBuffer<Entry>,
    closed: bool,
}

impl Logger {
    /// Create a logger with no sinks
    pub fn new(retention: Retention) -> Self {
        Self {
            sinks: Vec::new(),
            history: HistoryBuffer::new(retention),
            closed: false,
        }
    }

    /// Append a sink; it will receive entries after every sink added
    /// before it
    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Builder-style variant of [`Logger::add_sink`]
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Detach the first sink with the given name
    ///
    /// The sink is returned still open; the caller decides whether to
    /// close it. Later entries go to the remaining sinks only.
    pub fn remove_sink(&mut self, name: &str) -> Option<Box<dyn Sink>> {
        let at = self.sinks.iter().position(|sink| sink.name() == name)?;
        Some(self.sinks.remove(at))
    }

    /// Number of attached sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Log one entry
    ///
    /// The entry lands in history before any sink runs, so a call that
    /// fails partway through dispatch still retains it. All filtering and
    /// serialization for the call completes before the first sink emits,
    /// so an entry that cannot be encoded reaches no sink at all. A sink
    /// error stops dispatch at that sink.
    pub fn log(&mut self, entry: Entry) -> Result<()> {
        if self.closed {
            return Err(CoreError::Closed);
        }

        if self.history.retention().capacity() != Some(0) {
            self.history.push(entry.clone());
        }

        // First pass: one filter run per distinct set, one serialization
        // per set that a wire sink will read.
        let mut filtered: HashMap<u64, Entry> = HashMap::new();
        let mut serialized: HashMap<u64, String> = HashMap::new();
        for sink in &self.sinks {
            let set = sink.filter_set();
            let id = set.id();
            if !filtered.contains_key(&id) {
                filtered.insert(id, set.apply(&entry));
            }
            if sink.wants_wire() && !serialized.contains_key(&id) {
                let wire = filtered[&id].to_wire().map_err(CoreError::from)?;
                serialized.insert(id, wire);
            }
        }

        // Second pass: emit in registration order. Both maps were filled
        // above for every id looked up here.
        for sink in &mut self.sinks {
            let id = sink.filter_set().id();
            if sink.wants_wire() {
                sink.emit(Payload::Wire(&serialized[&id]))?;
            } else {
                sink.emit(Payload::Entry(&filtered[&id]))?;
            }
        }

        Ok(())
    }

    /// Append an entry to history without dispatching it to any sink
    ///
    /// Used when restoring history from an earlier run.
    pub fn store(&mut self, entry: Entry) {
        self.history.push(entry);
    }

    /// Close every sink
    ///
    /// Every sink gets a close attempt even when an earlier one fails; the
    /// first error is returned. Repeat calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                tracing::warn!(sink = sink.name(), error = %e, "sink close failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no entries are retained
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The retained entry at `index`, oldest first
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.history.get(index)
    }

    /// The most recently retained entry
    pub fn last(&self) -> Option<&Entry> {
        self.history.last()
    }

    /// Iterate retained entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.history.iter()
    }

    /// The retention buffer itself
    pub fn history(&self) -> &HistoryBuffer<Entry> {
        &self.history
    }
}

impl Index<usize> for Logger {
    type Output = Entry;

    fn index(&self, index: usize) -> &Entry {
        &self.history[index]
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sinks", &self.sinks.len())
            .field("history", &self.history.len())
            .field("closed", &self.closed)
            .finish()
    }
}
