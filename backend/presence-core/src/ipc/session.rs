//! Presence session: connection lifecycle, handshake and activity updates.
//!
//! # Lifecycle
//!
//! ```text
//! LoggedOut --login()--> LoggedIn --logout()--> LoggedOut
//! ```
//!
//! - `login` handshakes exactly once; calling it again while logged in is a no-op
//! - `send_activity` while logged out is a silent no-op
//! - a failed exchange gets one reconnect + resend before surfacing
//!   [`IpcError::SendFailed`]; the session stays logged in either way

use crate::activity::map_activity;
use crate::error::ipc::IpcError;
use crate::ipc::connection::{Connection, Connector};
use crate::ipc::frame::{Frame, Opcode};
use crate::ipc::payload::{Command, Handshake, check_command_response};

use models::Activity;

use std::io::{Error as IoError, ErrorKind};

use log::{debug, info, warn};

/// Exchanges attempted per `send_activity` call: the original plus one retry.
const SEND_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

pub struct Session<C: Connector> {
    connector: C,
    client_id: String,
    pid: u32,
    state: SessionState,
    connection: Option<Connection>,
}

impl<C: Connector> Session<C> {
    pub fn new(connector: C, client_id: impl Into<String>) -> Self {
        Self {
            connector,
            client_id: client_id.into(),
            pid: std::process::id(),
            state: SessionState::LoggedOut,
            connection: None,
        }
    }

    /// Report activities on behalf of another process.
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::LoggedIn
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open the connection and send the handshake.
    ///
    /// The handshake reply is read but not validated: any frame counts as
    /// acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::Handshake`] wrapping the connect, write or read
    /// failure that stopped it.
    pub async fn login(&mut self) -> Result<(), IpcError> {
        if self.is_logged_in() {
            debug!("Already logged in, skipping handshake");
            return Ok(());
        }

        let connection = self.open().await.map_err(IpcError::handshake)?;
        info!("Logged in via {}", connection.endpoint());

        self.connection = Some(connection);
        self.state = SessionState::LoggedIn;
        Ok(())
    }

    /// Mark the session logged out and close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::Close`] if the stream could not be shut down. The
    /// session is logged out regardless.
    pub async fn logout(&mut self) -> Result<(), IpcError> {
        self.state = SessionState::LoggedOut;

        match self.connection.take() {
            Some(connection) => {
                connection.close().await?;
                info!("Logged out");
            }
            None => debug!("Logout requested with no open connection"),
        }

        Ok(())
    }

    /// Send `SET_ACTIVITY` for `activity`.
    ///
    /// # Errors
    ///
    /// - [`IpcError::Encoding`] if the payload cannot be serialized or framed (not retried)
    /// - [`IpcError::Rejected`] if the remote side answers with an error event
    /// - [`IpcError::SendFailed`] if the exchange and its one retry both fail
    pub async fn send_activity(&mut self, activity: &Activity) -> Result<(), IpcError> {
        if !self.is_logged_in() {
            debug!("Not logged in, skipping activity update");
            return Ok(());
        }

        let command = Command::set_activity(self.pid, map_activity(activity));
        let payload = serde_json::to_vec(&command)?;

        let first_error = match self.exchange(&payload).await {
            Ok(response) => return check_command_response(&response.payload),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        warn!(
            "Activity update failed ({}), reconnecting once: {first_error}",
            first_error.error_category()
        );

        match self.reconnect_and_exchange(&payload).await {
            Ok(response) => {
                info!("Activity update succeeded after reconnect");
                check_command_response(&response.payload)
            }
            Err(e) => Err(IpcError::send_failed(SEND_ATTEMPTS, &e)),
        }
    }

    async fn open(&self) -> Result<Connection, IpcError> {
        let mut connection = self.connector.connect().await?;

        let handshake = serde_json::to_vec(&Handshake::new(&self.client_id))?;
        connection.send(Opcode::Handshake, &handshake).await?;

        let reply = connection.receive().await?;
        match reply.kind() {
            Some(Opcode::Close) => warn!(
                "Handshake answered with CLOSE, continuing anyway: {}",
                reply.payload_str()
            ),
            _ => debug!(
                "Handshake answered with opcode {} ({} bytes)",
                reply.opcode,
                reply.payload.len()
            ),
        }

        Ok(connection)
    }

    async fn exchange(&mut self, payload: &[u8]) -> Result<Frame, IpcError> {
        let connection = self.connection.as_mut().ok_or_else(|| {
            IpcError::write(
                Opcode::Frame.into(),
                &IoError::new(ErrorKind::NotConnected, "No open connection"),
            )
        })?;

        connection.send(Opcode::Frame, payload).await?;
        connection.receive_response().await
    }

    async fn reconnect_and_exchange(&mut self, payload: &[u8]) -> Result<Frame, IpcError> {
        if let Some(stale) = self.connection.take()
            && let Err(e) = stale.close().await
        {
            warn!("Ignoring close failure on broken connection: {e}");
        }

        let connection = self.open().await?;
        self.connection = Some(connection);
        self.exchange(payload).await
    }
}
