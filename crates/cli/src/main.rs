//! jot - structured experiment logging
//!
//! # Usage
//!
//! ```bash
//! # Aggregate remote producers into one log
//! jot serve --config jot.toml
//!
//! # Follow a live stream, catching up from a snapshot first
//! jot tail --host train-box
//!
//! # Forward a JSONL file to a running broker
//! jot send results.jsonl --name trainer-3
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jot_config::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// jot - structured experiment logging
#[derive(Parser, Debug)]
#[command(name = "jot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an aggregation broker
    Serve(cmd::serve::ServeArgs),

    /// Follow a live entry stream
    Tail(cmd::tail::TailArgs),

    /// Forward JSONL entries to a broker
    Send(cmd::send::SendArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(mut args) => {
            // CLI global --config overrides subcommand config if both specified
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            let log_level = resolve_log_level(cli.log_level.as_deref(), args.config.as_deref());
            init_logging(&log_level)?;
            cmd::serve::run(args).await
        }
        Command::Tail(args) => {
            // Tail initializes its own logging
            cmd::tail::run(args).await
        }
        Command::Send(args) => {
            let log_level = resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref());
            init_logging(&log_level)?;
            cmd::send::run(args).await
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config_path: Option<&std::path::Path>) -> String {
    // CLI flag takes precedence
    if let Some(level) = cli_level {
        return level.to_string();
    }

    // Try to load from config file if specified
    if let Some(path) = config_path {
        if path.exists() {
            if let Ok(config) = Config::from_file(path) {
                return config.log.level.as_str().to_string();
            }
        }
    }

    // Default
    "info".to_string()
}

/// Initialize the tracing subscriber for logging
///
/// The JOT_LOG environment variable overrides the resolved level.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env("JOT_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
