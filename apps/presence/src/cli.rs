//! Command-line flags. These win over the config file and environment.

use presence_core::config::PresenceConfig;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Default, Parser)]
#[command(name = "presence")]
#[command(about = "Publish live system stats as rich presence")]
#[command(version)]
pub struct Cli {
    /// Directory holding presence.toml
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for presence.log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Application client id registered with the presence app
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// Seconds between metric samples
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Skip uploading system info to the paste service
    #[arg(long)]
    pub no_upload: bool,

    /// Skip running the system info tool
    #[arg(long)]
    pub no_snapshot: bool,
}

impl Cli {
    pub fn apply(&self, config: &mut PresenceConfig) {
        if let Some(client_id) = &self.client_id {
            config.client_id = client_id.trim().to_string();
        }
        if let Some(interval) = self.interval {
            config.scheduler.poll_interval_secs = interval;
        }
        if self.no_upload {
            config.upload.enabled = false;
        }
        if self.no_snapshot {
            config.snapshot.enabled = false;
            config.upload.enabled = false;
        }
    }
}
