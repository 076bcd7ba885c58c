//! Error types for the presence IPC session.
//!
//! Key design decisions:
//! - One variant per failure class, so retry decisions match on the variant
//! - I/O failures keep the opcode they happened under, never the raw bytes
//! - All errors include ErrorLocation for debugging
//! - `#[track_caller]` for automatic location capture

use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;
use std::time::Duration;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum IpcError {
    #[error("Connect Error: {endpoint}: {message} {location}")]
    Connect {
        endpoint: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Timeout Error: {endpoint} not accepting after {timeout_ms}ms {location}")]
    ConnectTimeout {
        endpoint: String,
        timeout_ms: u64,
        location: ErrorLocation,
    },

    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<IpcError>,
    },

    #[error("Write Error: opcode {opcode}: {message} {location}")]
    Write {
        opcode: u32,
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        opcode: Option<u32>,
        message: String,
        location: ErrorLocation,
    },

    #[error("Close Error: {message} {location}")]
    Close {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Failed Error: gave up after {attempts} attempts: {message} {location}")]
    SendFailed {
        attempts: u32,
        message: String,
        location: ErrorLocation,
    },

    #[error("Encoding Error: {message} {location}")]
    Encoding {
        message: String,
        location: ErrorLocation,
    },

    #[error("Rejected Error: code {code}: {message} {location}")]
    Rejected {
        code: i64,
        message: String,
        location: ErrorLocation,
    },
}

impl IpcError {
    #[track_caller]
    pub fn connect(endpoint: impl Into<String>, error: &IoError) -> Self {
        IpcError::Connect {
            endpoint: endpoint.into(),
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn connect_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        IpcError::ConnectTimeout {
            endpoint: endpoint.into(),
            timeout_ms: timeout.as_millis() as u64,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn handshake(source: IpcError) -> Self {
        IpcError::Handshake {
            message: format!("Handshake did not complete ({})", source.error_category()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(source),
        }
    }

    #[track_caller]
    pub fn write(opcode: u32, error: &IoError) -> Self {
        IpcError::Write {
            opcode,
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn read(opcode: Option<u32>, message: impl Into<String>) -> Self {
        IpcError::Read {
            opcode,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn close(error: &IoError) -> Self {
        IpcError::Close {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn send_failed(attempts: u32, last: &IpcError) -> Self {
        IpcError::SendFailed {
            attempts,
            message: last.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn encoding(message: impl Into<String>) -> Self {
        IpcError::Encoding {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        IpcError::Rejected {
            code,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether a reconnect-and-resend has a chance of succeeding.
    ///
    /// Encoding failures and remote rejections would fail identically on a new
    /// connection. A close failure leaves the remote side in an unknown state.
    pub fn is_retryable(&self) -> bool {
        match self {
            IpcError::Connect { .. } => true,
            IpcError::ConnectTimeout { .. } => true,
            IpcError::Handshake { .. } => true,
            IpcError::Write { .. } => true,
            IpcError::Read { .. } => true,
            IpcError::SendFailed { .. } => true,

            IpcError::Close { .. } => false,
            IpcError::Encoding { .. } => false,
            IpcError::Rejected { .. } => false,
        }
    }

    /// Whether this failure happened at the stream level, mid-frame.
    pub fn is_io(&self) -> bool {
        matches!(self, IpcError::Write { .. } | IpcError::Read { .. })
    }

    /// Get error category for logs.
    pub fn error_category(&self) -> &'static str {
        match self {
            IpcError::Connect { .. } => "connect",
            IpcError::ConnectTimeout { .. } => "connect_timeout",
            IpcError::Handshake { .. } => "handshake",
            IpcError::Write { .. } => "write",
            IpcError::Read { .. } => "read",
            IpcError::Close { .. } => "close",
            IpcError::SendFailed { .. } => "send_failed",
            IpcError::Encoding { .. } => "encoding",
            IpcError::Rejected { .. } => "rejected",
        }
    }

    /// Opcode the failing frame carried, when known.
    pub fn opcode(&self) -> Option<u32> {
        match self {
            IpcError::Write { opcode, .. } => Some(*opcode),
            IpcError::Read { opcode, .. } => *opcode,
            IpcError::Handshake { source, .. } => source.opcode(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for IpcError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        IpcError::Encoding {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
