//! JSON Lines Sink - One serialized entry per line
//!
//! The simplest durable sink: the logger hands over the already-serialized
//! wire line and this sink appends it to a buffered file, newline
//! terminated. Creating the sink truncates the target, matching the
//! start-of-run semantics of a fresh experiment log.
//!
//! # Output Format
//!
//! ```text
//! {"iteration":1,"training_error":0.25}
//! {"iteration":2,"training_error":0.23}
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use jot_core::{CoreError, FilterSet, Payload, Result, Sink};

/// Writes wire lines to a plain file
pub struct JsonlSink {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    filter: FilterSet,
}

impl JsonlSink {
    /// Create or truncate the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), "json lines sink opened");
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path,
            filter: FilterSet::new(),
        })
    }

    /// Attach a filter chain
    #[must_use]
    pub fn with_filter_set(mut self, filter: FilterSet) -> Self {
        self.filter = filter;
        self
    }

    /// The file this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for JsonlSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn wants_wire(&self) -> bool {
        true
    }

    fn filter_set(&self) -> &FilterSet {
        &self.filter
    }

    fn emit(&mut self, payload: Payload<'_>) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CoreError::sink("jsonl", "sink is closed"))?;
        match payload {
            Payload::Wire(wire) => {
                writer.write_all(wire.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            Payload::Entry(entry) => {
                let wire = entry.to_wire()?;
                writer.write_all(wire.as_bytes())?;
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for JsonlSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonlSink")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "jsonl_test.rs"]
mod tests;
