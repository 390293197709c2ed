//! Tail command - Follow a live entry stream
//!
//! Connect to a streaming logger, replay its history, and print entries
//! as they arrive.

use std::io::{stdout, IsTerminal};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

use jot::{ConsoleConfig, ConsoleSink, Entry, Payload, Replay, Sink};

use crate::cmd::resolve_addr;

/// Tail command arguments
#[derive(Args, Debug)]
pub struct TailArgs {
    /// Host running the streaming logger
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Broadcast port
    #[arg(short, long, default_value = "5557")]
    port: u16,

    /// Snapshot port
    #[arg(long, default_value = "5556")]
    snapshot_port: u16,

    /// Skip the history snapshot and print live entries only
    #[arg(long)]
    live: bool,

    /// Print raw wire lines (one JSON object per entry)
    #[arg(long)]
    raw: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Quiet mode (suppress connection messages)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output (show debug info)
    #[arg(short, long)]
    verbose: bool,
}

/// Run the tail command
pub async fn run(args: TailArgs) -> Result<()> {
    // Set up logging for tail command
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let broadcast = resolve_addr(&format!("{}:{}", args.host, args.port)).await?;
    let snapshot = if args.live {
        None
    } else {
        Some(resolve_addr(&format!("{}:{}", args.host, args.snapshot_port)).await?)
    };

    if !args.quiet {
        tracing::info!(%broadcast, "connecting to stream");
    }

    let mut replay = Replay::start(snapshot, broadcast)
        .await
        .context("failed to connect to stream")?;

    if !args.quiet {
        tracing::info!("streaming entries (Ctrl+C to stop)");
    }

    // Enable color only if: stdout is TTY AND --no-color not set
    let use_color = stdout().is_terminal() && !args.no_color;
    let mut printer = Printer::new(use_color, args.raw);

    // Main loop with signal handling
    loop {
        tokio::select! {
            result = replay.next() => {
                match result {
                    Ok(Some(entry)) => {
                        if let Err(e) = printer.print(&entry) {
                            tracing::error!(error = %e, "print error");
                            break;
                        }
                    }
                    Ok(None) => {
                        if !args.quiet {
                            tracing::info!("stream closed");
                        }
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "receive error");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !args.quiet {
                    tracing::info!("interrupted, shutting down");
                }
                break;
            }
        }
    }

    Ok(())
}

/// Prints entries with a timestamp rule between them
struct Printer {
    sink: ConsoleSink,
    rule: Style,
    raw: bool,
}

impl Printer {
    fn new(use_color: bool, raw: bool) -> Self {
        let config = if use_color {
            ConsoleConfig::default()
        } else {
            ConsoleConfig::no_color()
        };
        let rule = if use_color {
            Style::new().dimmed()
        } else {
            Style::new()
        };
        Self {
            sink: ConsoleSink::new(config),
            rule,
            raw,
        }
    }

    fn print(&mut self, entry: &Entry) -> Result<()> {
        if self.raw {
            println!("{}", entry.to_wire()?);
            return Ok(());
        }

        let stamp = Local::now().format("%H:%M:%S%.3f");
        println!("{}", format!("── {stamp}").style(self.rule));
        self.sink.emit(Payload::Entry(entry))?;
        Ok(())
    }
}
