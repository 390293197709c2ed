//! Send command - Forward JSONL entries to a broker
//!
//! Reads one JSON object per line from a file or stdin and logs each as
//! a session entry on a running broker.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use jot::{Entry, RemoteLogger};

use crate::cmd::resolve_addr;

/// Send command arguments
#[derive(Args, Debug)]
pub struct SendArgs {
    /// JSONL file to send; stdin if omitted
    pub input: Option<PathBuf>,

    /// Host running the broker
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Broker port
    #[arg(short, long, default_value = "5555")]
    pub port: u16,

    /// Session name (anonymous sessions get an ordinal)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Run the send command
pub async fn run(args: SendArgs) -> Result<()> {
    let addr = resolve_addr(&format!("{}:{}", args.host, args.port)).await?;

    let mut session = RemoteLogger::connect(addr, args.name.as_deref())
        .await
        .with_context(|| format!("failed to join broker at {addr}"))?;

    let reader: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut lines = reader.lines();
    let mut lineno = 0usize;
    let mut count = 0usize;
    while let Some(line) = lines.next_line().await? {
        lineno += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry =
            Entry::from_wire(line).with_context(|| format!("invalid entry on line {lineno}"))?;
        session
            .log(&entry)
            .await
            .with_context(|| format!("broker rejected entry on line {lineno}"))?;
        count += 1;
    }

    session.close().await.context("failed to close session")?;
    info!(entries = count, "sent");
    Ok(())
}
