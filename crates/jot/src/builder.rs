//! User-friendly logger assembly

use std::path::{Path, PathBuf};

use jot_core::{Logger, Retention, Sink};
use jot_sinks::{ConsoleConfig, ConsoleSink, GzipSink, JsonlSink};
use jot_stream::{StreamConfig, StreamSink};

use crate::BuildError;

/// Assembles a [`Logger`] with the standard sink stack
///
/// Sinks are registered in a fixed order: file, console, stream. The
/// console sink is on by default; everything else is opt-in. Building is
/// async because the streaming sink binds its listeners up front; local
/// setups without streaming can also skip the builder entirely and use
/// [`Logger::new`] with [`Logger::add_sink`].
#[derive(Debug, Clone)]
pub struct LoggerBuilder {
    file: Option<PathBuf>,
    console: bool,
    color: bool,
    retention: Retention,
    stream: Option<StreamConfig>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            file: None,
            console: true,
            color: true,
            retention: Retention::Off,
            stream: None,
        }
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write entries to `path`; a `.gz` suffix compresses on the fly
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Toggle the pretty-printing console sink
    #[must_use]
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Toggle ANSI colors in console output
    #[must_use]
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// How many dispatched entries the logger keeps for indexing
    #[must_use]
    pub fn retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Also publish entries to live subscribers
    #[must_use]
    pub fn stream(mut self, config: StreamConfig) -> Self {
        self.stream = Some(config);
        self
    }

    /// Creates the file, binds the stream listeners, and returns the logger
    pub async fn build(self) -> Result<Logger, BuildError> {
        let mut logger = Logger::new(self.retention);
        if let Some(path) = &self.file {
            logger.add_sink(file_sink(path)?);
        }
        if self.console {
            let config = if self.color {
                ConsoleConfig::default()
            } else {
                ConsoleConfig::no_color()
            };
            logger.add_sink(Box::new(ConsoleSink::new(config)));
        }
        if let Some(config) = self.stream {
            logger.add_sink(Box::new(StreamSink::bind(config).await?));
        }
        Ok(logger)
    }
}

/// Picks the file sink from the extension
fn file_sink(path: &Path) -> Result<Box<dyn Sink>, BuildError> {
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzipSink::create(path)?))
    } else {
        Ok(Box::new(JsonlSink::create(path)?))
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
