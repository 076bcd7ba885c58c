//! Transport: one duplex byte stream to the presence application.
//!
//! [`Connector`] is the seam between the session and the platform. The
//! production [`SocketConnector`] walks the resolved endpoints (Unix socket
//! or named pipe) with a bounded connect timeout; tests plug in in-memory
//! streams.

use crate::error::ipc::IpcError;
use crate::ipc::endpoint::{Endpoint, EndpointProbe, EndpointResolver, SystemProbe};
use crate::ipc::frame::{Frame, Opcode, read_frame, write_frame};

use std::future::Future;
use std::io::{Error as IoError, ErrorKind};
use std::time::Duration;

use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(windows)]
const PIPE_BUSY_OS_ERROR: i32 = 231;
#[cfg(windows)]
const PIPE_BUSY_RETRY: Duration = Duration::from_millis(50);

/// Anything the session can speak frames over.
pub trait IpcStream: AsyncRead + AsyncWrite + Unpin + Send + Sync {}

impl<T> IpcStream for T where T: AsyncRead + AsyncWrite + Unpin + Send + Sync {}

/// An open stream to one endpoint.
///
/// Owned by exactly one session. Reconnecting replaces the whole value.
pub struct Connection {
    stream: Box<dyn IpcStream>,
    endpoint: String,
}

impl Connection {
    pub fn new(stream: impl IpcStream + 'static, endpoint: impl Into<String>) -> Self {
        Self {
            stream: Box::new(stream),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(&mut self, opcode: Opcode, payload: &[u8]) -> Result<(), IpcError> {
        write_frame(&mut self.stream, opcode.into(), payload).await
    }

    pub async fn receive(&mut self) -> Result<Frame, IpcError> {
        read_frame(&mut self.stream).await
    }

    /// Wait for the reply to a command.
    ///
    /// Keepalive pings arriving first are answered with a pong echoing their
    /// payload. A close frame ends the wait as a read failure.
    pub async fn receive_response(&mut self) -> Result<Frame, IpcError> {
        loop {
            let frame = self.receive().await?;

            match frame.kind() {
                Some(Opcode::Ping) => {
                    trace!("Answering keepalive ping on {}", self.endpoint);
                    self.send(Opcode::Pong, &frame.payload).await?;
                }
                Some(Opcode::Close) => {
                    return Err(IpcError::read(
                        Some(frame.opcode),
                        format!("Remote closed the connection: {}", frame.payload_str()),
                    ));
                }
                _ => return Ok(frame),
            }
        }
    }

    /// Shut the stream down.
    ///
    /// A peer that is already gone counts as closed.
    pub async fn close(mut self) -> Result<(), IpcError> {
        match self.stream.shutdown().await {
            Ok(()) => Ok(()),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::NotConnected | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset
                ) =>
            {
                debug!("Connection to {} already gone: {e}", self.endpoint);
                Ok(())
            }
            Err(e) => Err(IpcError::close(&e)),
        }
    }
}

/// Opens connections for a session.
pub trait Connector: Send + Sync {
    fn connect(&self) -> impl Future<Output = Result<Connection, IpcError>> + Send;
}

/// Connector for the real presence socket or named pipe.
pub struct SocketConnector<P: EndpointProbe = SystemProbe> {
    resolver: EndpointResolver<P>,
    timeout: Duration,
}

impl SocketConnector<SystemProbe> {
    pub fn new() -> Self {
        Self::with_resolver(EndpointResolver::new())
    }
}

impl Default for SocketConnector<SystemProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: EndpointProbe> SocketConnector<P> {
    pub fn with_resolver(resolver: EndpointResolver<P>) -> Self {
        Self {
            resolver,
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<P: EndpointProbe> Connector for SocketConnector<P> {
    async fn connect(&self) -> Result<Connection, IpcError> {
        let mut last_error = None;

        for endpoint in self.resolver.endpoints() {
            match open(&endpoint, self.timeout).await {
                Ok(connection) => {
                    debug!("Connected to {endpoint}");
                    return Ok(connection);
                }
                Err(e) => {
                    trace!("Endpoint {endpoint} unavailable: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            IpcError::connect(
                "<none>",
                &IoError::new(ErrorKind::NotFound, "No endpoints to try"),
            )
        }))
    }
}

async fn open(endpoint: &Endpoint, limit: Duration) -> Result<Connection, IpcError> {
    let name = endpoint.to_string();

    match endpoint {
        #[cfg(unix)]
        Endpoint::Socket(path) => {
            let connect = tokio::net::UnixStream::connect(path);
            let stream = connect_within(&name, limit, connect).await?;
            Ok(Connection::new(stream, name))
        }
        #[cfg(windows)]
        Endpoint::Pipe(pipe) => {
            let client = connect_within(&name, limit, open_pipe(pipe)).await?;
            Ok(Connection::new(client, name))
        }
        #[allow(unreachable_patterns)]
        _ => Err(IpcError::connect(
            name,
            &IoError::new(ErrorKind::Unsupported, "Endpoint kind not supported here"),
        )),
    }
}

/// Bound a platform connect by `limit`.
///
/// An I/O failure maps to [`IpcError::Connect`]; running out of time maps to
/// [`IpcError::ConnectTimeout`].
pub(crate) async fn connect_within<T, F>(
    endpoint: &str,
    limit: Duration,
    connect: F,
) -> Result<T, IpcError>
where
    F: Future<Output = std::io::Result<T>>,
{
    match timeout(limit, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(IpcError::connect(endpoint, &e)),
        Err(_) => Err(IpcError::connect_timeout(endpoint, limit)),
    }
}

#[cfg(windows)]
async fn open_pipe(
    name: &str,
) -> std::io::Result<tokio::net::windows::named_pipe::NamedPipeClient> {
    use tokio::net::windows::named_pipe::ClientOptions;

    loop {
        match ClientOptions::new().open(name) {
            Ok(client) => return Ok(client),
            Err(e) if e.raw_os_error() == Some(PIPE_BUSY_OS_ERROR) => {
                tokio::time::sleep(PIPE_BUSY_RETRY).await;
            }
            Err(e) => return Err(e),
        }
    }
}
