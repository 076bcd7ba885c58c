use presence_core::config::PresenceConfig;
use presence_core::error::config::ConfigError;

use std::fs;

use tempfile::TempDir;

/// **VALUE**: Verifies parse errors name the offending file and capture location.
///
/// **WHY THIS MATTERS**: A typo in presence.toml stops startup; the message must
/// say which file to fix.
///
/// **BUG THIS CATCHES**: Would catch dropping the path from the Display format.
#[test]
fn given_invalid_file_when_load_then_error_names_path() {
    // GIVEN: A config file with a type error
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("presence.toml"),
        "[scheduler]\npoll_interval_secs = \"often\"\n",
    )
    .unwrap();

    // WHEN: Loading
    let err = PresenceConfig::load(dir.path()).unwrap_err();
    let error_string = err.to_string();

    // THEN: Parse error mentioning presence.toml
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(error_string.contains("presence.toml"), "got: {error_string}");
}

#[test]
fn given_zero_reconnect_attempts_in_file_when_load_then_validation_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("presence.toml"), "[reconnect]\nattempts = 0\n").unwrap();

    let err = PresenceConfig::load(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Validation { .. }));
    assert!(err.to_string().contains("attempts"));
}
