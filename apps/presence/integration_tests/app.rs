use presence::app::{build_profile, load_config};
use presence::cli::Cli;
use presence::error::PresenceError;

use presence_core::config::{CLIENT_ID_ENV, PresenceConfig};

use std::fs;

use serial_test::serial;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Integration tests for startup wiring
// Config layering and profile building, without a presence app
// ============================================================================

fn cli_for(dir: &TempDir) -> Cli {
    Cli {
        config_dir: Some(dir.path().to_path_buf()),
        ..Cli::default()
    }
}

/// **VALUE**: Verifies file < environment < flag precedence for the client id.
///
/// **WHY THIS MATTERS**: Users set the id once in the file and override it
/// ad hoc; the wrong order silently publishes under another application.
///
/// **BUG THIS CATCHES**: Would catch applying CLI flags before the environment.
#[test]
#[serial]
fn given_all_layers_when_load_config_then_flag_beats_env_beats_file() {
    // GIVEN: File, env and flag all set the client id
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("presence.toml"), "client_id = \"file\"\n").unwrap();
    unsafe { std::env::set_var(CLIENT_ID_ENV, "env") };

    // WHEN: Loading with and without the flag
    let without_flag = load_config(&cli_for(&dir));
    let with_flag = load_config(&Cli {
        client_id: Some(String::from("flag")),
        ..cli_for(&dir)
    });
    unsafe { std::env::remove_var(CLIENT_ID_ENV) };

    // THEN: Env beats file, flag beats env
    assert_eq!(without_flag.unwrap().client_id, "env");
    assert_eq!(with_flag.unwrap().client_id, "flag");
}

#[test]
#[serial]
fn given_no_client_id_anywhere_when_load_config_then_missing_client_id_error() {
    let dir = TempDir::new().unwrap();
    unsafe { std::env::remove_var(CLIENT_ID_ENV) };

    let result = load_config(&cli_for(&dir));

    assert!(matches!(result, Err(PresenceError::MissingClientId { .. })));
}

#[test]
#[serial]
fn given_zero_interval_flag_when_load_config_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = load_config(&Cli {
        client_id: Some(String::from("42")),
        interval: Some(0),
        ..cli_for(&dir)
    });

    assert!(matches!(result, Err(PresenceError::Config { .. })));
}

#[tokio::test]
async fn given_snapshot_disabled_when_build_profile_then_live_metrics_profile() {
    let mut config = PresenceConfig::default();
    config.snapshot.enabled = false;

    let profile = build_profile(&config).await;

    assert!(profile.static_details.is_none());
    assert!(profile.button.is_none());
    assert_eq!(profile.large_image, "default_os");
}

/// **VALUE**: Verifies snapshot output is parsed and uploaded, and the link becomes a button.
///
/// **WHY THIS MATTERS**: This is the whole startup enrichment path: tool →
/// parser → paste service → button.
///
/// **BUG THIS CATCHES**: Would catch uploading the parsed summary instead of
/// the full tool output, or losing the link on the way to the profile.
#[cfg(unix)]
#[tokio::test]
async fn given_snapshot_and_paste_service_when_build_profile_then_details_and_button() {
    // GIVEN: A shell "tool" and a paste service that accepts uploads
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("https://paste.rs/Sys"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = PresenceConfig::default();
    config.snapshot.command = String::from("sh");
    config.snapshot.args = vec![
        String::from("-c"),
        String::from("printf 'me@box\\nOS: Ubuntu 24.04 LTS\\nKernel: Linux 6.8\\n'"),
    ];
    config.upload.url = server.uri();

    // WHEN: Building the profile
    let profile = build_profile(&config).await;

    // THEN: Static details, distro image and paste button
    assert_eq!(
        profile.static_details.as_deref(),
        Some("OS: Ubuntu 24.04 LTS\nKernel: Linux 6.8")
    );
    assert_eq!(profile.large_image, "ubuntu");
    let button = profile.button.expect("paste link should become a button");
    assert_eq!(button.url, "https://paste.rs/Sys");
}

#[cfg(unix)]
#[tokio::test]
async fn given_paste_service_down_when_build_profile_then_no_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = PresenceConfig::default();
    config.snapshot.command = String::from("sh");
    config.snapshot.args = vec![String::from("-c"), String::from("echo 'OS: Debian 12'")];
    config.upload.url = server.uri();

    let profile = build_profile(&config).await;

    assert!(profile.button.is_none());
    assert_eq!(profile.static_details.as_deref(), Some("OS: Debian 12"));
}
