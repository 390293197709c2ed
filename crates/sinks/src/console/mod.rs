//! Console Sink - Human-readable terminal output
//!
//! Renders each entry as indented `key: value` lines, recursing into
//! nested objects. Tagged numeric arrays print as a compact summary
//! instead of their raw payload.
//!
//! # Output Format
//!
//! ```text
//! iteration: 10
//! training:
//!   error: 0.23
//!   cost: 0.45
//! weights: ndarray(<f8, shape=[100,10])
//! ```

use std::fmt;
use std::io::{self, Write};

use owo_colors::{OwoColorize, Style};
use serde_json::Value;

use jot_core::{FilterSet, Payload, Result, Sink};
use jot_protocol::{Entry, NDARRAY_KEY};

/// Configuration for the console sink
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Enable colored output
    pub color: bool,

    /// Spaces added per nesting level
    pub indent: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            color: true,
            indent: 2,
        }
    }
}

impl ConsoleConfig {
    /// Create config with colors disabled (for piped output)
    pub fn no_color() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }
}

// =============================================================================
// Color Styles
// =============================================================================

/// Color styles for terminal output
struct Styles {
    key: Style,
    array: Style,
}

impl Styles {
    fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                key: Style::new().cyan(),
                array: Style::new().dimmed(),
            }
        } else {
            Self {
                key: Style::new(),
                array: Style::new(),
            }
        }
    }
}

// =============================================================================
// Sink
// =============================================================================

/// Writes entries as indented text, stdout by default
pub struct ConsoleSink {
    config: ConsoleConfig,
    styles: Styles,
    filter: FilterSet,
    out: Box<dyn Write + Send>,
}

impl ConsoleSink {
    /// Create a sink writing to stdout
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_writer(config, Box::new(io::stdout()))
    }

    /// Create a sink writing to an arbitrary writer
    pub fn with_writer(config: ConsoleConfig, out: Box<dyn Write + Send>) -> Self {
        let styles = Styles::new(config.color);
        Self {
            config,
            styles,
            filter: FilterSet::new(),
            out,
        }
    }

    /// Attach a filter chain
    #[must_use]
    pub fn with_filter_set(mut self, filter: FilterSet) -> Self {
        self.filter = filter;
        self
    }

    fn write_entry(&mut self, entry: &Entry) -> io::Result<()> {
        for (key, value) in entry.iter() {
            write_pair(&mut self.out, &self.styles, key, value, 0, self.config.indent)?;
        }
        self.out.flush()
    }
}

fn write_pair(
    out: &mut dyn Write,
    styles: &Styles,
    key: &str,
    value: &Value,
    depth: usize,
    step: usize,
) -> io::Result<()> {
    let pad = depth * step;
    match value {
        Value::Object(map) if map.contains_key(NDARRAY_KEY) => {
            writeln!(
                out,
                "{:pad$}{}: {}",
                "",
                key.style(styles.key),
                array_summary(map).style(styles.array)
            )
        }
        Value::Object(map) => {
            writeln!(out, "{:pad$}{}:", "", key.style(styles.key))?;
            for (inner_key, inner_value) in map {
                write_pair(out, styles, inner_key, inner_value, depth + 1, step)?;
            }
            Ok(())
        }
        Value::String(s) => writeln!(out, "{:pad$}{}: {}", "", key.style(styles.key), s),
        other => writeln!(out, "{:pad$}{}: {}", "", key.style(styles.key), other),
    }
}

/// Compact description of a tagged numeric array
fn array_summary(map: &serde_json::Map<String, Value>) -> String {
    let descr = map
        .get("descr")
        .and_then(Value::as_str)
        .unwrap_or("?");
    let shape = map
        .get("shape")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!("ndarray({descr}, shape={shape})")
}

impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn filter_set(&self) -> &FilterSet {
        &self.filter
    }

    fn emit(&mut self, payload: Payload<'_>) -> Result<()> {
        match payload {
            Payload::Entry(entry) => self.write_entry(entry)?,
            Payload::Wire(wire) => {
                writeln!(self.out, "{wire}")?;
                self.out.flush()?;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("config", &self.config)
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
