//! Reading log files back
//!
//! Restores history from a file written by the `jsonl` or `gzip` sink.
//! Files ending in `.gz` are decompressed; concatenated gzip members from
//! multiple sessions read as one stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use jot_core::{HistoryBuffer, Logger, Result};
use jot_protocol::Entry;

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every entry from a log file
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for line in open_reader(path.as_ref())?.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        entries.push(Entry::from_wire(&line)?);
    }
    Ok(entries)
}

/// Restore a logger's history from a log file
///
/// Counts every line in the file but keeps only what the logger's
/// retention policy allows, parsing just the kept tail. Restored entries
/// go straight to history and are not dispatched to sinks. Returns the
/// total number of lines in the file.
pub fn load(logger: &mut Logger, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut kept = HistoryBuffer::new(logger.history().retention());
    let mut total = 0usize;

    for line in open_reader(path)?.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        total += 1;
        kept.push(line);
    }

    for line in kept.iter() {
        logger.store(Entry::from_wire(line)?);
    }

    tracing::debug!(
        path = %path.display(),
        total,
        restored = logger.len(),
        "history loaded"
    );
    Ok(total)
}

#[cfg(test)]
#[path = "load_test.rs"]
mod tests;
