use crate::ipc::helpers::{FakePresenceServer, TEST_CLIENT_ID};

use presence_core::config::{DisplayConfig, PresenceConfig};
use presence_core::ipc::Session;
use presence_core::ipc::frame::Opcode;
use presence_core::metrics::SysinfoMetrics;
use presence_core::scheduler::{PresenceProfile, Scheduler};

use std::time::Duration;

use tokio::time::sleep as TokioSleep;

/// **VALUE**: Verifies the full pipeline: real metrics, real socket, run loop, shutdown.
///
/// **WHY THIS MATTERS**: This is exactly what the executable wires together.
/// The first tick sends after one interval and shutdown closes the socket.
///
/// **BUG THIS CATCHES**: Would catch the first tick never firing, or run()
/// returning without logging out.
#[tokio::test]
async fn given_fake_presence_app_when_scheduler_runs_then_first_update_sent_and_logged_out() {
    // GIVEN: A scheduler with a 1s interval against a fake app
    let server = FakePresenceServer::start(0);
    let session = Session::new(server.connector(), TEST_CLIENT_ID);
    let mut config = PresenceConfig::default();
    config.scheduler.poll_interval_secs = 1;
    let mut scheduler = Scheduler::new(
        session,
        SysinfoMetrics::new(),
        PresenceProfile::new(&DisplayConfig::default()),
        &config,
    );

    // WHEN: Running for one and a half intervals
    scheduler
        .run(TokioSleep(Duration::from_millis(1_500)))
        .await
        .unwrap();

    // THEN: Exactly one update with the live state line, and the session is closed
    let commands = server.documents(Opcode::Frame);
    assert_eq!(commands.len(), 1);
    let state = commands[0]["args"]["activity"]["state"].as_str().unwrap();
    assert!(state.starts_with("CPU ") && state.contains("RAM"), "state: {state}");
    assert!(!scheduler.session().is_logged_in());
}
