//! Gzip Sink - Compressed JSON lines
//!
//! Same line format as the `jsonl` sink, gzip compressed. The file is
//! opened in append mode and each process session writes one fresh gzip
//! member, so a crash costs at most the unflushed tail of the current
//! member and earlier sessions stay readable. `load::read_entries`
//! decompresses all members in order.
//!
//! # Output Format
//!
//! One gzip member per session, each holding newline-terminated JSON:
//!
//! ```text
//! run.jsonl.gz = gzip(session 1 lines) + gzip(session 2 lines) + ...
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use jot_core::{CoreError, FilterSet, Payload, Result, Sink};

/// Writes wire lines through a gzip encoder
pub struct GzipSink {
    writer: Option<BufWriter<GzEncoder<File>>>,
    path: PathBuf,
    filter: FilterSet,
}

impl GzipSink {
    /// Open `path` for appending and start a new gzip member
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let encoder = GzEncoder::new(file, Compression::default());
        tracing::debug!(path = %path.display(), "gzip sink opened");
        Ok(Self {
            writer: Some(BufWriter::new(encoder)),
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

impl Sink for GzipSink {
    fn name(&self) -> &'static str {
        "gzip"
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
            .ok_or_else(|| CoreError::sink("gzip", "sink is closed"))?;
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

    /// Finish the current gzip member
    fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let encoder = writer.into_inner().map_err(|e| e.into_error())?;
            encoder.finish()?;
        }
        Ok(())
    }
}

impl fmt::Debug for GzipSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipSink")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "gzip_test.rs"]
mod tests;
