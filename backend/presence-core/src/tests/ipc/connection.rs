// Unit tests for Connection keepalive handling and close semantics

use crate::error::ipc::IpcError;
use crate::ipc::frame::{Opcode, read_frame, write_frame};
use crate::ipc::connection::connect_within;
use crate::ipc::{Connection, Connector, EndpointResolver, SocketConnector};

use std::future::pending;
use std::io::{Error as IoError, ErrorKind};
use std::time::Duration;

use tokio::io::{DuplexStream, duplex};
use tokio::time::Instant;

/// **VALUE**: Verifies a PING received while waiting for a reply is answered with a matching PONG.
///
/// **WHY THIS MATTERS**: The presence application drops clients that ignore
/// keepalives, which would look like random disconnects.
///
/// **BUG THIS CATCHES**: Would catch returning the PING as if it were the reply.
#[tokio::test]
async fn given_ping_before_reply_when_receive_response_then_pongs_and_returns_reply() {
    // GIVEN: A server that pings, then replies
    let (client, mut server) = duplex(1024);
    let mut connection = Connection::new(client, "duplex");

    let server_task = tokio::spawn(async move {
        write_frame(&mut server, Opcode::Ping.into(), b"beat")
            .await
            .unwrap();
        write_frame(&mut server, Opcode::Frame.into(), b"{}")
            .await
            .unwrap();
        read_frame(&mut server).await.unwrap()
    });

    // WHEN: Waiting for the response
    let reply = connection.receive_response().await.unwrap();

    // THEN: The real reply comes back and the server saw an echoing PONG
    assert_eq!(reply.kind(), Some(Opcode::Frame));
    let pong = server_task.await.unwrap();
    assert_eq!(pong.kind(), Some(Opcode::Pong));
    assert_eq!(pong.payload, b"beat");
}

#[tokio::test]
async fn given_close_frame_when_receive_response_then_returns_read_error() {
    let (client, mut server) = duplex(1024);
    let mut connection = Connection::new(client, "duplex");
    write_frame(&mut server, Opcode::Close.into(), br#"{"code":1000}"#)
        .await
        .unwrap();

    let error = connection.receive_response().await.unwrap_err();

    assert!(matches!(error, IpcError::Read { opcode: Some(2), .. }));
}

/// **VALUE**: Verifies closing a connection whose peer is already gone is not an error.
///
/// **WHY THIS MATTERS**: Close must be idempotent: the reconnect path closes
/// connections that just failed, and logout may follow a crash of the remote app.
///
/// **BUG THIS CATCHES**: Would catch surfacing shutdown errors on a dead peer.
#[tokio::test]
async fn given_peer_dropped_when_close_then_ok() {
    // GIVEN: A connection whose server end has been dropped
    let (client, server) = duplex(64);
    drop(server);
    let connection = Connection::new(client, "duplex");

    // WHEN: Closing it
    let result = connection.close().await;

    // THEN: No error
    assert!(result.is_ok());
}

#[cfg(unix)]
#[tokio::test]
async fn given_directory_without_sockets_when_connect_then_returns_connect_error() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = EndpointResolver::new().with_known_dirs(vec![dir.path().to_path_buf()]);
    let connector = SocketConnector::with_resolver(resolver).with_timeout(Duration::from_millis(200));

    let error = connector.connect().await.err().expect("connect should fail");

    assert_eq!(error.error_category(), "connect");
    assert!(error.to_string().contains("discord-ipc-9"));
}

/// **VALUE**: Verifies a connect that never completes becomes a ConnectTimeout at the limit.
///
/// **WHY THIS MATTERS**: Opening a named pipe with no listener can block
/// forever. Without the bound, login would hang and the scheduler would
/// never tick again.
///
/// **BUG THIS CATCHES**: Would catch the timeout being dropped or mapped to
/// a plain Connect error that hides how long the attempt took.
#[tokio::test(start_paused = true)]
async fn given_connect_that_never_completes_when_connect_within_then_connect_timeout_at_limit() {
    // GIVEN: A connect future that never resolves
    let started = Instant::now();
    let limit = Duration::from_secs(2);

    // WHEN: Bounding it by 2s
    let never = pending::<std::io::Result<DuplexStream>>();
    let result = connect_within("discord-ipc-0", limit, never).await;

    // THEN: ConnectTimeout naming the endpoint, after exactly the limit
    match result {
        Err(IpcError::ConnectTimeout {
            endpoint,
            timeout_ms,
            ..
        }) => {
            assert_eq!(endpoint, "discord-ipc-0");
            assert_eq!(timeout_ms, 2000);
        }
        other => panic!("Expected ConnectTimeout, got {:?}", other.err()),
    }
    assert_eq!(started.elapsed(), limit);
}

#[tokio::test(start_paused = true)]
async fn given_connect_refused_when_connect_within_then_connect_error_not_timeout() {
    let refused = async {
        Err::<DuplexStream, _>(IoError::new(ErrorKind::ConnectionRefused, "refused"))
    };

    let error = connect_within("discord-ipc-1", Duration::from_secs(2), refused)
        .await
        .err()
        .expect("refused connect should fail");

    assert!(matches!(error, IpcError::Connect { .. }));
    assert!(error.is_retryable());
}
