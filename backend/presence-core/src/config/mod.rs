//! Presence configuration.
//!
//! Layering, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. `{config_dir}/presence.toml`
//! 3. Environment (`PRESENCE_CLIENT_ID`, optionally from a `.env` file)
//! 4. Command-line flags (applied by the executable)

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "presence.toml";
const CONFIG_VERSION: u32 = 1;
const APP_DIR_NAME: &str = "presence";
const LOG_DIR_NAME: &str = "logs";

pub const CLIENT_ID_ENV: &str = "PRESENCE_CLIENT_ID";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_percent_threshold")]
    pub cpu_threshold_pct: f64,
    #[serde(default = "default_percent_threshold")]
    pub memory_threshold_pct: f64,
    #[serde(default = "default_network_threshold_bytes")]
    pub network_threshold_bytes: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            cpu_threshold_pct: default_percent_threshold(),
            memory_threshold_pct: default_percent_threshold(),
            network_threshold_bytes: default_network_threshold_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_reconnect_attempts")]
    pub attempts: u32,
    #[serde(default = "default_reconnect_backoff_secs")]
    pub backoff_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            attempts: default_reconnect_attempts(),
            backoff_secs: default_reconnect_backoff_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_details_max_chars")]
    pub details_max_chars: usize,
    #[serde(default = "default_small_image")]
    pub small_image: String,
    #[serde(default = "default_large_image")]
    pub default_large_image: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            details_max_chars: default_details_max_chars(),
            small_image: default_small_image(),
            default_large_image: default_large_image(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_snapshot_command")]
    pub command: String,
    #[serde(default = "default_snapshot_args")]
    pub args: Vec<String>,
    #[serde(default = "default_snapshot_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_snapshot_command(),
            args: default_snapshot_args(),
            timeout_secs: default_snapshot_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_upload_url")]
    pub url: String,
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_upload_url(),
            timeout_secs: default_upload_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Application id registered with the presence service.
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub reconnect: ReconnectConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            client_id: String::new(),
            scheduler: SchedulerConfig::default(),
            reconnect: ReconnectConfig::default(),
            display: DisplayConfig::default(),
            snapshot: SnapshotConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_true() -> bool {
    true
}
fn default_poll_interval_secs() -> u64 {
    10
}
fn default_percent_threshold() -> f64 {
    2.0
}
fn default_network_threshold_bytes() -> u64 {
    10 * 1024
}
fn default_reconnect_attempts() -> u32 {
    3
}
fn default_reconnect_backoff_secs() -> u64 {
    1
}
fn default_details_max_chars() -> usize {
    128
}
fn default_small_image() -> String {
    "dot".to_string()
}
fn default_large_image() -> String {
    "default_os".to_string()
}
fn default_snapshot_command() -> String {
    "fastfetch".to_string()
}
fn default_snapshot_args() -> Vec<String> {
    vec!["-l".to_string(), "none".to_string()]
}
fn default_snapshot_timeout_secs() -> u64 {
    2
}
fn default_upload_url() -> String {
    "https://paste.rs".to_string()
}
fn default_upload_timeout_secs() -> u64 {
    5
}

// ============================================
// IMPLEMENTATION
// ============================================

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl ReconnectConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl SnapshotConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PresenceConfig {
    /// Load config from {config_dir}/presence.toml.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Read {
            path: config_path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        let config: PresenceConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse {}: {}", config_path.display(), e);
            ConfigError::Parse {
                path: config_path.clone(),
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/presence.toml using temp file + rename.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Write {
            path: config_dir.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        std::fs::write(&temp_path, contents).map_err(|e| ConfigError::Write {
            path: temp_path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::Write {
            path: config_path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Apply environment overrides on top of the loaded file.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first;
    /// variables already set in the process environment win over it.
    pub fn apply_env_overrides(&mut self) {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {e}"),
        }

        if let Ok(client_id) = std::env::var(CLIENT_ID_ENV)
            && !client_id.trim().is_empty()
        {
            debug!("Client id overridden by {CLIENT_ID_ENV}");
            self.client_id = client_id.trim().to_string();
        }
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation(format!(
                "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                self.version
            )));
        }

        if self.scheduler.poll_interval_secs == 0 {
            return Err(validation("poll_interval_secs must be at least 1"));
        }

        for (name, value) in [
            ("cpu_threshold_pct", self.scheduler.cpu_threshold_pct),
            ("memory_threshold_pct", self.scheduler.memory_threshold_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.reconnect.attempts == 0 {
            return Err(validation("reconnect attempts must be at least 1"));
        }

        if self.snapshot.enabled && self.snapshot.command.trim().is_empty() {
            return Err(validation("snapshot command cannot be empty"));
        }

        if !self.upload.url.starts_with("http://") && !self.upload.url.starts_with("https://") {
            return Err(validation(format!(
                "Invalid upload URL format: {}",
                self.upload.url
            )));
        }

        Ok(())
    }
}

#[track_caller]
fn validation(reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        reason: reason.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// `{platform config dir}/presence`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ConfigError::Directory {
            message: "No platform config directory available".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// `{platform local data dir}/presence/logs`
pub fn default_log_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
        .ok_or_else(|| ConfigError::Directory {
            message: "No platform data directory available".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}
