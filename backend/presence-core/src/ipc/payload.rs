//! JSON documents carried inside frames.

use crate::PROTOCOL_VERSION;
use crate::activity::WireActivity;
use crate::error::ipc::IpcError;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const SET_ACTIVITY_COMMAND: &str = "SET_ACTIVITY";
const ERROR_EVENT: &str = "ERROR";

#[derive(Debug, Clone, Serialize)]
pub struct Handshake<'a> {
    pub v: u32,
    pub client_id: &'a str,
}

impl<'a> Handshake<'a> {
    pub fn new(client_id: &'a str) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            client_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Command {
    pub cmd: &'static str,
    pub args: CommandArgs,
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandArgs {
    pub pid: u32,
    pub activity: WireActivity,
}

impl Command {
    /// `SET_ACTIVITY` for `pid` with a freshly generated nonce.
    pub fn set_activity(pid: u32, activity: WireActivity) -> Self {
        Self {
            cmd: SET_ACTIVITY_COMMAND,
            args: CommandArgs { pid, activity },
            nonce: new_nonce(),
        }
    }
}

/// Random RFC 4122 (version 4) identifier used to correlate a reply.
pub fn new_nonce() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Default, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    evt: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Inspect the reply to a command.
///
/// Only an explicit `ERROR` event counts as failure. Replies that are not
/// JSON, or JSON of an unexpected shape, are accepted.
pub fn check_command_response(payload: &[u8]) -> Result<(), IpcError> {
    let response: CommandResponse = match serde_json::from_slice(payload) {
        Ok(response) => response,
        Err(e) => {
            debug!("Ignoring unparseable command response: {e}");
            return Ok(());
        }
    };

    if response.evt.as_deref() != Some(ERROR_EVENT) {
        return Ok(());
    }

    let data = response.data.unwrap_or(Value::Null);
    let code = data.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string();

    Err(IpcError::rejected(code, message))
}
