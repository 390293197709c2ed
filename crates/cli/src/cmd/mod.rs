//! Command implementations for the jot CLI

pub mod send;
pub mod serve;
pub mod tail;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::lookup_host;

/// Resolve `host:port` to the first matching socket address
pub async fn resolve_addr(spec: &str) -> Result<SocketAddr> {
    lookup_host(spec)
        .await
        .with_context(|| format!("cannot resolve '{spec}'"))?
        .next()
        .with_context(|| format!("'{spec}' resolved to no addresses"))
}
