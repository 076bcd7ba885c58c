pub mod activity;
pub mod config;
pub mod error;
pub mod ipc;
pub mod metrics;
pub mod scheduler;
pub mod snapshot;
pub mod upload;


/// Handshake protocol version understood by the presence application.
pub const PROTOCOL_VERSION: u32 = 1;
pub const IPC_SOCKET_PREFIX: &str = "discord-ipc-";
pub const IPC_SOCKET_SLOTS: u8 = 10;
pub const IPC_PIPE_PREFIX: &str = const_format::concatcp!(r"\\.\pipe\", IPC_SOCKET_PREFIX);
