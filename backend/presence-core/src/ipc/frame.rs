//! Length-prefixed frame codec.
//!
//! Every message on the socket is an 8-byte header (opcode, payload length,
//! both little-endian `u32`) followed by exactly `length` payload bytes.
//!
//! Reads never assume a single `read` call returns a whole header or payload:
//! both are accumulated until complete or the stream ends.

use crate::error::ipc::IpcError;

use std::fmt::{Display, Formatter, Result as FormatResult};

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const HEADER_LEN: usize = 8;

/// Frames announcing more than this are treated as a corrupt stream.
pub const MAX_PAYLOAD_LEN: u32 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    Handshake = 0,
    Frame = 1,
    Close = 2,
    Ping = 3,
    Pong = 4,
}

impl Opcode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Opcode::Handshake),
            1 => Some(Opcode::Frame),
            2 => Some(Opcode::Close),
            3 => Some(Opcode::Ping),
            4 => Some(Opcode::Pong),
            _ => None,
        }
    }
}

impl From<Opcode> for u32 {
    fn from(opcode: Opcode) -> Self {
        opcode as u32
    }
}

impl Display for Opcode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            Opcode::Handshake => "HANDSHAKE",
            Opcode::Frame => "FRAME",
            Opcode::Close => "CLOSE",
            Opcode::Ping => "PING",
            Opcode::Pong => "PONG",
        };
        write!(formatter, "{name}")
    }
}

/// One decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn kind(&self) -> Option<Opcode> {
        Opcode::from_u32(self.opcode)
    }

    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Serialize header + payload into one buffer.
///
/// # Errors
///
/// Returns [`IpcError::Encoding`] if the payload is longer than
/// [`MAX_PAYLOAD_LEN`], since no reader would accept the frame.
pub fn encode_frame(opcode: u32, payload: &[u8]) -> Result<Vec<u8>, IpcError> {
    let length = u32::try_from(payload.len())
        .ok()
        .filter(|length| *length <= MAX_PAYLOAD_LEN)
        .ok_or_else(|| {
            IpcError::encoding(format!(
                "Payload of {} bytes exceeds frame limit {MAX_PAYLOAD_LEN}",
                payload.len()
            ))
        })?;

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&opcode.to_le_bytes());
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Write one frame as a single logical write.
///
/// # Errors
///
/// - [`IpcError::Encoding`] if the payload is over [`MAX_PAYLOAD_LEN`]; nothing is written
/// - [`IpcError::Write`] on a short write or any stream error
pub async fn write_frame<W>(writer: &mut W, opcode: u32, payload: &[u8]) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let buf = encode_frame(opcode, payload)?;

    writer
        .write_all(&buf)
        .await
        .map_err(|e| IpcError::write(opcode, &e))?;
    writer
        .flush()
        .await
        .map_err(|e| IpcError::write(opcode, &e))?;

    trace!("Wrote frame opcode={opcode} length={}", payload.len());
    Ok(())
}

/// Read one complete frame.
///
/// # Errors
///
/// Returns [`IpcError::Read`] if the stream closes or fails before the
/// header or payload is complete, or if the announced length exceeds
/// [`MAX_PAYLOAD_LEN`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, IpcError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; HEADER_LEN];
    fill(reader, &mut header, None, "header").await?;

    let opcode = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    if length == 0 {
        trace!("Read frame opcode={opcode} length=0");
        return Ok(Frame {
            opcode,
            payload: Vec::new(),
        });
    }

    if length > MAX_PAYLOAD_LEN {
        return Err(IpcError::read(
            Some(opcode),
            format!("Frame length {length} exceeds limit {MAX_PAYLOAD_LEN}"),
        ));
    }

    let mut payload = vec![0u8; length as usize];
    fill(reader, &mut payload, Some(opcode), "payload").await?;

    trace!("Read frame opcode={opcode} length={length}");
    Ok(Frame { opcode, payload })
}

/// Accumulate reads until `buf` is full.
async fn fill<R>(
    reader: &mut R,
    buf: &mut [u8],
    opcode: Option<u32>,
    part: &str,
) -> Result<(), IpcError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read(&mut buf[filled..])
            .await
            .map_err(|e| IpcError::read(opcode, format!("Failed to read frame {part}: {e}")))?;

        if n == 0 {
            return Err(IpcError::read(
                opcode,
                format!(
                    "Stream closed after {filled} of {} {part} bytes",
                    buf.len()
                ),
            ));
        }

        filled += n;
    }
    Ok(())
}
