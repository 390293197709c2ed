//! Client side of the aggregation protocol

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::{debug, info};

use jot_protocol::{read_text_frame, write_message, Entry, ACK, DONE, READY};

use crate::broker::tune_stream;
use crate::{RemoteError, Result};

/// Forwards entries to a [`Broker`](crate::Broker) over TCP
///
/// Every call runs in lockstep with the broker: `log` does not return
/// until the entry is acknowledged, so `Ok` means the broker has already
/// dispatched the entry to its sinks.
#[derive(Debug)]
pub struct RemoteLogger {
    stream: TcpStream,
    name: Option<String>,
    closed: bool,
}

impl RemoteLogger {
    /// Joins the broker at `addr`, optionally under a session name
    ///
    /// Anonymous sessions are tagged with a join ordinal instead.
    pub async fn connect(addr: SocketAddr, name: Option<&str>) -> Result<Self> {
        let mut stream = TcpStream::connect(addr).await?;
        tune_stream(&stream);

        let aux = name.unwrap_or_default();
        write_message(&mut stream, &[READY.as_bytes(), aux.as_bytes()]).await?;
        expect_token(&mut stream, READY).await?;

        info!(%addr, name = aux, "joined aggregation broker");
        Ok(Self {
            stream,
            name: name.map(str::to_owned),
            closed: false,
        })
    }

    /// The session name given at connect time, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sends one entry and waits for the broker to acknowledge it
    pub async fn log(&mut self, entry: &Entry) -> Result<()> {
        if self.closed {
            return Err(RemoteError::Closed);
        }
        let wire = entry.to_wire()?;
        write_message(&mut self.stream, &[wire.as_bytes(), b""]).await?;
        expect_token(&mut self.stream, ACK).await
    }

    /// Leaves the session; the broker stops once every session has left
    ///
    /// Closing twice is fine, the second call does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        write_message(&mut self.stream, &[DONE.as_bytes(), b""]).await?;
        expect_token(&mut self.stream, DONE).await?;
        debug!("left aggregation broker");
        Ok(())
    }
}

/// Reads one reply frame and checks it against the expected token
async fn expect_token(stream: &mut TcpStream, expected: &str) -> Result<()> {
    match read_text_frame(stream).await? {
        Some(token) if token == expected => Ok(()),
        Some(token) => Err(RemoteError::Handshake {
            expected: expected.to_owned(),
            got: token,
        }),
        None => Err(RemoteError::Rejected),
    }
}
