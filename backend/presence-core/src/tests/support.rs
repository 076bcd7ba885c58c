// Shared fakes for session and scheduler tests.
// FakeConnector hands out in-memory streams, each served by a scripted
// presence server task.

use crate::error::ipc::IpcError;
use crate::error::metrics::MetricsError;
use crate::ipc::frame::{Opcode, read_frame, write_frame};
use crate::ipc::{Connection, Connector};
use crate::metrics::{MetricsProvider, MetricsSample};

use common::ErrorLocation;

use std::collections::VecDeque;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{DuplexStream, duplex};

pub const READY_PAYLOAD: &[u8] = br#"{"cmd":"DISPATCH","evt":"READY"}"#;
pub const PING_PAYLOAD: &[u8] = b"keepalive";

/// How the fake presence server treats one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Refuse the connection outright.
    Refuse,
    /// Answer the handshake and every command.
    Healthy,
    /// Answer the handshake, then hang up.
    DropAfterHandshake,
    /// Answer commands with an ERROR event.
    Reject,
    /// Ping before each command reply and wait for the pong.
    PingFirst,
}

#[derive(Default)]
pub struct ServerLog {
    pub handshakes: AtomicUsize,
    pub pongs: AtomicUsize,
    pub commands: Mutex<Vec<Value>>,
}

impl ServerLog {
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn pongs(&self) -> usize {
        self.pongs.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<Value> {
        self.commands.lock().unwrap().clone()
    }
}

/// Connector handing out one scripted connection per `connect` call.
///
/// Once the script runs out every further connect is refused.
#[derive(Default)]
pub struct FakeConnector {
    script: Mutex<VecDeque<Behaviour>>,
    connects: AtomicUsize,
    log: Arc<ServerLog>,
}

impl FakeConnector {
    pub fn scripted(behaviours: &[Behaviour]) -> Self {
        Self {
            script: Mutex::new(behaviours.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Arc<ServerLog> {
        Arc::clone(&self.log)
    }
}

impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Connection, IpcError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let behaviour = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Behaviour::Refuse);

        if behaviour == Behaviour::Refuse {
            return Err(IpcError::connect(
                "fake",
                &IoError::new(ErrorKind::ConnectionRefused, "refused by script"),
            ));
        }

        let (client, server) = duplex(4096);
        tokio::spawn(serve(server, behaviour, Arc::clone(&self.log)));
        Ok(Connection::new(client, "fake"))
    }
}

async fn serve(mut stream: DuplexStream, behaviour: Behaviour, log: Arc<ServerLog>) {
    let Ok(handshake) = read_frame(&mut stream).await else {
        return;
    };
    if handshake.kind() == Some(Opcode::Handshake) {
        log.handshakes.fetch_add(1, Ordering::SeqCst);
    }
    if write_frame(&mut stream, Opcode::Frame.into(), READY_PAYLOAD)
        .await
        .is_err()
    {
        return;
    }

    if behaviour == Behaviour::DropAfterHandshake {
        return;
    }

    while let Ok(frame) = read_frame(&mut stream).await {
        if frame.kind() != Some(Opcode::Frame) {
            continue;
        }

        let command: Value = serde_json::from_slice(&frame.payload).unwrap_or(Value::Null);
        let nonce = command["nonce"].clone();
        log.commands.lock().unwrap().push(command);

        if behaviour == Behaviour::PingFirst {
            if write_frame(&mut stream, Opcode::Ping.into(), PING_PAYLOAD)
                .await
                .is_err()
            {
                return;
            }
            match read_frame(&mut stream).await {
                Ok(pong) if pong.kind() == Some(Opcode::Pong) && pong.payload == PING_PAYLOAD => {
                    log.pongs.fetch_add(1, Ordering::SeqCst);
                }
                _ => return,
            }
        }

        let reply = if behaviour == Behaviour::Reject {
            json!({
                "cmd": "SET_ACTIVITY",
                "evt": "ERROR",
                "data": { "code": 4000, "message": "invalid activity" },
                "nonce": nonce,
            })
        } else {
            json!({ "cmd": "SET_ACTIVITY", "evt": null, "data": {}, "nonce": nonce })
        };

        let bytes = serde_json::to_vec(&reply).unwrap();
        if write_frame(&mut stream, Opcode::Frame.into(), &bytes)
            .await
            .is_err()
        {
            return;
        }
    }
}

/// Metrics provider replaying a fixed list of readings.
pub struct ScriptedMetrics {
    samples: VecDeque<Option<MetricsSample>>,
}

impl ScriptedMetrics {
    /// `None` entries produce a sampling error.
    pub fn new(samples: Vec<Option<MetricsSample>>) -> Self {
        Self {
            samples: samples.into(),
        }
    }
}

impl MetricsProvider for ScriptedMetrics {
    fn sample(&mut self) -> Result<MetricsSample, MetricsError> {
        match self.samples.pop_front().flatten() {
            Some(sample) => Ok(sample),
            None => Err(MetricsError::Sample {
                message: "scripted failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

pub fn sample(cpu: f64, memory: f64) -> MetricsSample {
    MetricsSample {
        cpu_percent: cpu,
        memory_percent: memory,
        rx_bytes_per_sec: 0.0,
        tx_bytes_per_sec: 0.0,
    }
}
