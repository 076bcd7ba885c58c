//! Startup wiring: config layering, the one-off system snapshot, and the
//! scheduler run.

use crate::cli::Cli;
use crate::error::PresenceError;

use presence_core::config::{PresenceConfig, UploadConfig, default_config_dir};
use presence_core::error::upload::UploadError;
use presence_core::ipc::{Session, SocketConnector};
use presence_core::metrics::SysinfoMetrics;
use presence_core::scheduler::{PresenceProfile, Scheduler};
use presence_core::snapshot::{SystemSnapshot, capture};
use presence_core::upload::PasteClient;

use common::ErrorLocation;

use std::future::Future;
use std::panic::Location;

use log::{info, warn};
use url::Url;

/// Load `presence.toml`, then apply environment and command-line overrides.
///
/// # Errors
///
/// Returns [`PresenceError::Config`] for unreadable or invalid config, and
/// [`PresenceError::MissingClientId`] if no layer provides a client id.
pub fn load_config(cli: &Cli) -> Result<PresenceConfig, PresenceError> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };

    let mut config = PresenceConfig::load(&config_dir)?;
    config.apply_env_overrides();
    cli.apply(&mut config);
    config.validate()?;

    if config.client_id.is_empty() {
        return Err(PresenceError::MissingClientId {
            message: format!(
                "Set client_id in {}, PRESENCE_CLIENT_ID, or --client-id",
                config_dir.join("presence.toml").display()
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(config)
}

/// Static display fields: snapshot details and the optional paste button.
///
/// Never fails; a missing tool or unreachable paste service just means a
/// plainer presence.
pub async fn build_profile(config: &PresenceConfig) -> PresenceProfile {
    if !config.snapshot.enabled {
        return PresenceProfile::new(&config.display);
    }

    let output = match capture(&config.snapshot).await {
        Ok(output) => output,
        Err(e) => {
            warn!("System snapshot unavailable, using live metrics only: {e}");
            return PresenceProfile::new(&config.display);
        }
    };

    let snapshot = SystemSnapshot::parse(&output);
    if let Some(user_host) = snapshot.user_host() {
        info!("Snapshot captured for {user_host}");
    }
    let profile = PresenceProfile::from_snapshot(&snapshot, &config.display);

    if !config.upload.enabled {
        return profile;
    }

    match upload(&config.upload, &output).await {
        Ok(url) => profile.with_paste_url(&url),
        Err(e) => {
            warn!("System info upload failed, continuing without link: {e}");
            profile
        }
    }
}

async fn upload(config: &UploadConfig, text: &str) -> Result<Url, UploadError> {
    PasteClient::new(&config.url, config.timeout())?
        .upload(text)
        .await
}

/// Run the presence loop until `shutdown` resolves.
pub async fn run<F>(config: PresenceConfig, shutdown: F) -> Result<(), PresenceError>
where
    F: Future<Output = ()>,
{
    let profile = build_profile(&config).await;

    let session = Session::new(SocketConnector::new(), config.client_id.clone());
    let mut scheduler = Scheduler::new(session, SysinfoMetrics::new(), profile, &config);

    info!(
        "Updating presence every {}s",
        config.scheduler.poll_interval_secs
    );
    scheduler.run(shutdown).await?;

    info!("Presence stopped");
    Ok(())
}
