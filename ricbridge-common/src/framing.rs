//! Length-prefixed frame codec for the agent channel
//!
//! Every TCP exchange with the external agent is a frame: a 4-byte
//! big-endian body length followed by the body (UTF-8 JSON). The length
//! never counts itself and must lie in `1..=MAX_FRAME_BYTES`.
//!
//! Reads are all-or-nothing: a frame is returned only once its header and
//! its whole body have arrived. Any error leaves the stream in an unknown
//! position, so callers drop the connection and reconnect.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length prefix in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// Largest accepted frame body (1 MiB).
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Errors produced while reading or writing frames.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The header announced an empty body.
    #[error("frame length is zero")]
    ZeroLength,

    /// The header (or an outgoing body) exceeds the frame cap.
    #[error("frame length {length} exceeds maximum of {max} bytes")]
    TooLarge { length: usize, max: usize },

    /// The peer closed the stream before a full frame arrived.
    #[error("stream closed mid-frame")]
    Closed,

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FramingError {
    fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FramingError::Closed
        } else {
            FramingError::Io(err)
        }
    }
}

fn check_length(length: usize) -> Result<(), FramingError> {
    if length == 0 {
        return Err(FramingError::ZeroLength);
    }
    if length > MAX_FRAME_BYTES {
        return Err(FramingError::TooLarge {
            length,
            max: MAX_FRAME_BYTES,
        });
    }
    Ok(())
}

/// Builds the wire form of a frame: length prefix followed by `body`.
///
/// Bodies that a peer would reject (empty or over the cap) are refused
/// here instead of being put on the wire.
pub fn encode_frame(body: &[u8]) -> Result<Bytes, FramingError> {
    check_length(body.len())?;
    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + body.len());
    buf.put_u32(body.len() as u32);
    buf.put_slice(body);
    Ok(buf.freeze())
}

/// Writes one frame and flushes the writer.
///
/// # Errors
///
/// Returns an error if the body is empty or too large, or if the write
/// fails.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(body)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads exactly one frame and returns its body.
///
/// Waits until the 4 header bytes and then the announced number of body
/// bytes are available. The length is validated before any body byte is
/// consumed.
///
/// # Errors
///
/// * `ZeroLength` / `TooLarge` when the header is out of range
/// * `Closed` when the stream ends before the frame is complete
/// * `Io` for any other read failure
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, FramingError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_LEN];
    reader
        .read_exact(&mut header)
        .await
        .map_err(FramingError::from_read)?;

    let length = u32::from_be_bytes(header) as usize;
    check_length(length)?;

    let mut body = vec![0u8; length];
    reader
        .read_exact(&mut body)
        .await
        .map_err(FramingError::from_read)?;
    Ok(body)
}
