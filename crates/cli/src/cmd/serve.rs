//! Serve command - Run an aggregation broker
//!
//! Remote producers join, stream entries, and leave; the broker feeds every
//! entry through a locally configured sink stack. The broker stops when the
//! last producer leaves or on Ctrl+C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tracing::info;

use jot::{Broker, BrokerConfig, LoggerBuilder, StreamConfig};
use jot_config::Config;

use crate::cmd::resolve_addr;

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (error if specified but not found)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:5555
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Write aggregated entries to this file; a .gz suffix compresses
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config_path = args
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(default)".to_string());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        "jot broker starting"
    );

    // Load configuration
    let config = match args.config {
        Some(path) => {
            // User explicitly provided config path - must exist
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "config file not found: {}",
                    path.display()
                ));
            }
            Config::from_file(&path).context("failed to load configuration")?
        }
        None => {
            let default_path = PathBuf::from("jot.toml");
            if default_path.exists() {
                info!(config = %default_path.display(), "using config file");
                Config::from_file(&default_path).context("failed to load configuration")?
            } else {
                info!("no config file found, using defaults (console sink on port 5555)");
                Config::default()
            }
        }
    };

    let logger = build_logger(&config, args.file).await?;

    // Bind the broker
    let listen_spec = match args.listen {
        Some(spec) => spec,
        None => config.remote.listen_addr(),
    };
    let listen_addr = resolve_addr(&listen_spec).await?;
    let broker = Broker::bind(BrokerConfig::default().with_listen_addr(listen_addr), logger)
        .await
        .context("failed to bind broker listener")?;

    info!(listen = %broker.local_addr(), "broker listening (Ctrl+C to stop)");

    // A signal cancels the broker, which then returns its logger for closing
    let cancel = broker.cancel_token();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, stopping broker...");
        cancel.cancel();
    });

    let mut logger = broker.run().await.context("broker failed")?;
    logger.close().context("failed to close sinks")?;

    info!("jot broker shutdown complete");
    Ok(())
}

/// Assemble the sink stack from config plus command line overrides
async fn build_logger(config: &Config, file_override: Option<PathBuf>) -> Result<jot::Logger> {
    let mut builder = LoggerBuilder::new()
        .console(config.logger.console)
        .color(config.logger.color)
        .retention(config.logger.retention.to_retention());

    let file = file_override.or_else(|| config.logger.file.clone().map(PathBuf::from));
    if let Some(path) = file {
        info!(file = %path.display(), "writing aggregated entries");
        builder = builder.file(path);
    }

    if config.stream.enabled {
        let broadcast = resolve_addr(&config.stream.broadcast_addr()).await?;
        let snapshot = resolve_addr(&config.stream.snapshot_addr()).await?;
        builder = builder.stream(
            StreamConfig::default()
                .with_broadcast_addr(broadcast)
                .with_snapshot_addr(snapshot)
                .with_history(config.stream.history.to_retention()),
        );
    }

    builder
        .build()
        .await
        .context("failed to assemble sink stack")
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
