//! IPC layer for talking to the local presence application.
//!
//! It provides:
//!
//! - Frame codec (little-endian opcode + length header, JSON payload)
//! - Endpoint resolution (Unix socket directory or Windows named pipe)
//! - Connections with a bounded connect timeout
//! - The [`Session`] state machine (handshake, updates, reconnect)
//!
//! # Protocol
//!
//! ```text
//! offset 0..4 : opcode (u32)   0 = handshake, 1 = command
//! offset 4..8 : length (u32)   payload byte count
//! offset 8..  : payload        UTF-8 JSON
//! ```
//!
//! Request/response is strictly alternating: one write, then one read.

pub mod connection;
pub mod endpoint;
pub mod frame;
pub mod payload;
pub mod session;

pub use connection::{CONNECT_TIMEOUT, Connection, Connector, IpcStream, SocketConnector};
pub use endpoint::{Endpoint, EndpointProbe, EndpointResolver, SystemProbe};
pub use frame::{Frame, Opcode, read_frame, write_frame};
pub use session::{Session, SessionState};
