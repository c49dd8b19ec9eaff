//! Frame Codec
//!
//! Every request and reply on the wire is one frame: an 8-byte big-endian
//! unsigned payload length followed by that many payload bytes. Zero-length
//! frames are legal.
//!
//! The reader enforces a hard cap on the declared length (1 GiB by default).
//! A scanner or a stray HTTP client that connects to the port will have its
//! first 8 bytes interpreted as a length; without the cap that "length" can
//! demand a multi-gigabyte allocation. Oversized frames terminate the
//! session silently; no reply is ever sent for a protocol error.

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Hard cap on a declared payload length: 1 GiB.
pub const MAX_PAYLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Errors that can occur while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Socket failure or short read; the session is over either way.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer declared a payload larger than the cap.
    #[error("declared payload of {declared} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        /// Length the peer declared
        declared: u64,
        /// The enforced cap
        max: u64,
    },
}

impl FrameError {
    /// True for the errors that mean "the peer simply went away":
    /// end-of-stream and connection resets, as opposed to protocol abuse.
    pub fn is_disconnect(&self) -> bool {
        match self {
            FrameError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
            ),
            FrameError::PayloadTooLarge { .. } => false,
        }
    }
}

/// Reads one frame, looping on partial reads until the payload is complete.
///
/// `max` bounds the declared length; anything larger fails before a single
/// payload byte is read or allocated.
pub async fn read_frame<R>(reader: &mut R, max: u64) -> Result<Bytes, FrameError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u64().await?;
    if len > max {
        return Err(FrameError::PayloadTooLarge {
            declared: len,
            max,
        });
    }
    if len == 0 {
        return Ok(Bytes::new());
    }

    let mut payload = BytesMut::zeroed(len as usize);
    reader.read_exact(&mut payload).await?;
    Ok(payload.freeze())
}

/// Writes one frame: length prefix, payload, flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u64(payload.len() as u64).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
