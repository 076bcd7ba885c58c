use presence_core::error::IpcError;
use presence_core::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the presence executable.
///
/// Everything recoverable (send failures, a missing snapshot tool, a failed
/// upload) is logged inside the scheduler and never reaches this type.
#[derive(Debug, Error)]
pub enum PresenceError {
    /// Error from this app (logger, directories)
    #[error("Presence Error: {message} {location}")]
    Presence {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// No client id in the config file, environment or flags
    #[error("Missing Client Id Error: {message} {location}")]
    MissingClientId {
        message: String,
        location: ErrorLocation,
    },

    /// Error from presence-core during shutdown
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for PresenceError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        PresenceError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<IpcError> for PresenceError {
    #[track_caller]
    fn from(error: IpcError) -> Self {
        PresenceError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
