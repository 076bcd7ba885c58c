mod error;
#[cfg(unix)]
mod ipc;
