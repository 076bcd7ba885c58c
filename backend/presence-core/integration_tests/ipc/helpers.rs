//! Test helpers for socket-level integration tests.
//!
//! [`FakePresenceServer`] listens on a real Unix socket in a temp directory
//! and speaks just enough of the protocol for a client:
//! - answers the handshake with a READY dispatch
//! - answers every command with an empty success reply
//! - records every frame it receives
//!
//! Connections are served one at a time, like the real application.

use presence_core::ipc::frame::{Frame, Opcode};
use presence_core::ipc::{EndpointResolver, SocketConnector, read_frame, write_frame};
use presence_core::IPC_SOCKET_PREFIX;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

pub const TEST_CLIENT_ID: &str = "1234567890";

pub struct FakePresenceServer {
    dir: TempDir,
    slot: u8,
    frames: Arc<Mutex<Vec<Frame>>>,
    task: JoinHandle<()>,
}

impl FakePresenceServer {
    /// Listen on `discord-ipc-<slot>` in a fresh temp directory.
    pub fn start(slot: u8) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let frames = Arc::new(Mutex::new(Vec::new()));
        let task = spawn_listener(socket_path(&dir, slot), Arc::clone(&frames));

        Self {
            dir,
            slot,
            frames,
            task,
        }
    }

    /// Kill the server, dropping any open client connection, and listen again.
    pub async fn restart(&mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;

        let path = socket_path(&self.dir, self.slot);
        std::fs::remove_file(&path).expect("Failed to remove old socket");
        self.task = spawn_listener(path, Arc::clone(&self.frames));
    }

    pub fn connector(&self) -> SocketConnector {
        let resolver = EndpointResolver::new().with_known_dirs(vec![self.dir.path().to_path_buf()]);
        SocketConnector::with_resolver(resolver)
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    /// Payloads of received frames with `opcode`, parsed as JSON.
    pub fn documents(&self, opcode: Opcode) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|frame| frame.kind() == Some(opcode))
            .map(|frame| serde_json::from_slice(&frame.payload).expect("payload should be JSON"))
            .collect()
    }
}

impl Drop for FakePresenceServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn socket_path(dir: &TempDir, slot: u8) -> PathBuf {
    dir.path().join(format!("{IPC_SOCKET_PREFIX}{slot}"))
}

fn spawn_listener(path: PathBuf, frames: Arc<Mutex<Vec<Frame>>>) -> JoinHandle<()> {
    let listener = UnixListener::bind(&path).expect("Failed to bind fake presence socket");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            while let Ok(frame) = read_frame(&mut stream).await {
                let opcode = frame.kind();
                let nonce = serde_json::from_slice::<Value>(&frame.payload)
                    .ok()
                    .and_then(|doc| doc.get("nonce").cloned())
                    .unwrap_or(Value::Null);
                frames.lock().unwrap().push(frame);

                let reply = match opcode {
                    Some(Opcode::Handshake) => json!({ "cmd": "DISPATCH", "evt": "READY" }),
                    Some(Opcode::Frame) => {
                        json!({ "cmd": "SET_ACTIVITY", "evt": null, "data": {}, "nonce": nonce })
                    }
                    _ => continue,
                };

                let bytes = serde_json::to_vec(&reply).unwrap();
                if write_frame(&mut stream, Opcode::Frame.into(), &bytes)
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }
    })
}
