//! Length-prefixed framing
//!
//! Every wire message is a short sequence of frames, each a 4-byte
//! big-endian length followed by that many payload bytes. A length prefix
//! above `MAX_FRAME_SIZE` means a corrupt or hostile peer and fails the
//! read before any allocation happens.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;
use crate::Result;

/// Largest frame accepted on the wire (16 MiB)
///
/// Large enough for serialized entries carrying array payloads, small
/// enough to bound per-connection memory.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Write one length-prefixed frame
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    Ok(())
}

/// Read one length-prefixed frame
///
/// Returns `None` when the peer closed the connection cleanly between
/// frames. A close in the middle of a frame body is an error.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut payload = vec![0u8; len];
    match reader.read_exact(&mut payload).await {
        Ok(_) => Ok(Some(payload.into())),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}

/// Read one frame and require UTF-8 text
pub async fn read_text_frame<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    match read_frame(reader).await? {
        Some(payload) => {
            let text = String::from_utf8(payload.to_vec())
                .map_err(|e| ProtocolError::protocol(format!("invalid UTF-8 frame: {e}")))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

/// Encode a multi-frame message into one contiguous buffer
///
/// The broadcast path encodes each message once and clones the resulting
/// `Bytes` per subscriber.
pub fn encode_message(parts: &[&[u8]]) -> Bytes {
    let total: usize = parts.iter().map(|part| part.len() + 4).sum();
    let mut buf = BytesMut::with_capacity(total);
    for part in parts {
        buf.put_u32(part.len() as u32);
        buf.put_slice(part);
    }
    buf.freeze()
}

/// Write a multi-frame message
pub async fn write_message<W>(writer: &mut W, parts: &[&[u8]]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    for part in parts {
        if part.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                len: part.len(),
                max: MAX_FRAME_SIZE,
            });
        }
    }
    writer.write_all(&encode_message(parts)).await?;
    Ok(())
}
