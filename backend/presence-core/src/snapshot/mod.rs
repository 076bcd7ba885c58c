//! System information snapshot.
//!
//! Runs an external system-info tool once at startup and turns its
//! `Key: Value` output into the static part of the presence display.

mod parser;

pub use parser::SystemSnapshot;

use crate::config::SnapshotConfig;
use crate::error::snapshot::SnapshotError;

use common::ErrorLocation;

use std::panic::Location;
use std::process::Stdio;

use log::{debug, warn};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Run the configured tool and return its combined stdout + stderr.
///
/// A non-zero exit still returns whatever was printed; partial output is
/// better than none for display purposes.
///
/// # Errors
///
/// - [`SnapshotError::Spawn`] if the program cannot be started
/// - [`SnapshotError::Timeout`] if it runs past the configured timeout
/// - [`SnapshotError::EmptyOutput`] if it printed nothing at all
pub async fn capture(config: &SnapshotConfig) -> Result<String, SnapshotError> {
    debug!("Running {} {:?}", config.command, config.args);

    let mut command = TokioCommand::new(&config.command);
    command
        .args(&config.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(config.timeout(), command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(SnapshotError::Spawn {
                message: format!("Failed to run {}: {e}", config.command),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            });
        }
        Err(_) => {
            return Err(SnapshotError::Timeout {
                message: format!(
                    "{} did not finish within {}s",
                    config.command, config.timeout_secs
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        warn!(
            "{} exited with {}, using partial output",
            config.command, output.status
        );
    }

    if text.trim().is_empty() {
        return Err(SnapshotError::EmptyOutput {
            message: format!("{} printed nothing", config.command),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(text)
}
