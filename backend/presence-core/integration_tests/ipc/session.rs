use crate::ipc::helpers::{FakePresenceServer, TEST_CLIENT_ID};

use presence_core::error::IpcError;
use presence_core::ipc::frame::Opcode;
use presence_core::ipc::{Connector, EndpointResolver, Session, SessionState, SocketConnector};

use models::ActivityBuilder;

use std::time::{Duration, SystemTime};

// ============================================================================
// Public API tests for Session over a real Unix socket
// ============================================================================

/// **VALUE**: Verifies login and an activity update reach a real socket listener.
///
/// **WHY THIS MATTERS**: This exercises endpoint resolution, connect, framing
/// and JSON together, the way the executable uses them.
///
/// **BUG THIS CATCHES**: Would catch any layer disagreeing with another, e.g.
/// the connector picking a different path than the resolver reports.
#[tokio::test]
async fn given_listening_server_when_login_and_send_then_handshake_and_command_arrive() {
    // GIVEN: A fake presence app on slot 0
    let server = FakePresenceServer::start(0);
    let mut session = Session::new(server.connector(), TEST_CLIENT_ID).with_pid(4242);
    let activity = ActivityBuilder::default()
        .with_details("OS: Arch Linux")
        .with_state("CPU 5% • RAM 30%")
        .with_start(SystemTime::now())
        .build()
        .unwrap();

    // WHEN: Logging in and sending
    session.login().await.unwrap();
    session.send_activity(&activity).await.unwrap();

    // THEN: One handshake with our client id, one SET_ACTIVITY command
    let handshakes = server.documents(Opcode::Handshake);
    assert_eq!(handshakes.len(), 1);
    assert_eq!(handshakes[0]["v"], 1);
    assert_eq!(handshakes[0]["client_id"], TEST_CLIENT_ID);

    let commands = server.documents(Opcode::Frame);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0]["cmd"], "SET_ACTIVITY");
    assert_eq!(commands[0]["args"]["pid"], 4242);
    assert_eq!(commands[0]["args"]["activity"]["details"], "OS: Arch Linux");
    assert!(commands[0]["args"]["activity"]["timestamps"]["start"].is_u64());
    assert!(commands[0]["args"]["activity"].get("party").is_none());
}

/// **VALUE**: Verifies the connector walks socket slots until one answers.
///
/// **WHY THIS MATTERS**: With several presence-app instances (stable, canary)
/// the socket can sit in any slot from 0 to 9.
///
/// **BUG THIS CATCHES**: Would catch only ever trying slot 0.
#[tokio::test]
async fn given_server_on_later_slot_when_connect_then_finds_it() {
    // GIVEN: Only slot 3 is listening
    let server = FakePresenceServer::start(3);

    // WHEN: Connecting
    let connection = server.connector().connect().await.unwrap();

    // THEN: Connected to slot 3
    assert!(connection.endpoint().ends_with("discord-ipc-3"));
}

/// **VALUE**: Verifies an activity update survives the presence app restarting.
///
/// **WHY THIS MATTERS**: Restarting the app is the most common real-world
/// cause of a broken connection.
///
/// **BUG THIS CATCHES**: Would catch a reconnect that reuses the dead stream
/// or forgets to handshake on the new one.
#[tokio::test]
async fn given_server_restarted_when_send_activity_then_reconnects_transparently() {
    // GIVEN: A logged-in session whose server then restarts
    let mut server = FakePresenceServer::start(0);
    let mut session = Session::new(server.connector(), TEST_CLIENT_ID);
    session.login().await.unwrap();
    server.restart().await;

    // WHEN: Sending
    let activity = ActivityBuilder::default().with_details("after restart").build().unwrap();
    let result = session.send_activity(&activity).await;

    // THEN: Success, two handshakes seen in total
    assert!(result.is_ok(), "expected success, got {result:?}");
    assert_eq!(server.documents(Opcode::Handshake).len(), 2);
    assert_eq!(session.state(), SessionState::LoggedIn);
}

#[tokio::test]
async fn given_no_server_when_login_then_handshake_error_wrapping_connect() {
    let dir = tempfile::tempdir().unwrap();
    let connector = SocketConnector::with_resolver(
        EndpointResolver::new().with_known_dirs(vec![dir.path().to_path_buf()]),
    )
    .with_timeout(Duration::from_millis(500));
    let mut session = Session::new(connector, TEST_CLIENT_ID);

    let error = session.login().await.unwrap_err();

    match &error {
        IpcError::Handshake { source, .. } => assert_eq!(source.error_category(), "connect"),
        other => panic!("Expected Handshake error, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::LoggedOut);
}
