use crate::activity::{Activity, Button, MAX_BUTTONS, Party, Secrets, Timestamps};
use crate::error::model_error::ModelError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::SystemTime;

/// Builder for creating validated Activity instances.
///
/// Only structural rules are enforced here (button count and shape, party
/// sizes). String lengths are left to the caller; the remote side decides
/// what it is willing to display.
#[derive(Debug, Default)]
pub struct ActivityBuilder {
    details: Option<String>,
    state: Option<String>,
    large_image: Option<String>,
    large_text: Option<String>,
    small_image: Option<String>,
    small_text: Option<String>,
    party: Option<Party>,
    timestamps: Option<Timestamps>,
    secrets: Option<Secrets>,
    buttons: Vec<Button>,
}

impl ActivityBuilder {
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_large_image(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.large_image = Some(key.into());
        self.large_text = Some(text.into());
        self
    }

    pub fn with_small_image(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.small_image = Some(key.into());
        self.small_text = Some(text.into());
        self
    }

    pub fn with_party(mut self, party: Party) -> Self {
        self.party = Some(party);
        self
    }

    pub fn with_start(mut self, start: SystemTime) -> Self {
        let timestamps = self.timestamps.get_or_insert_with(Timestamps::default);
        timestamps.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: SystemTime) -> Self {
        let timestamps = self.timestamps.get_or_insert_with(Timestamps::default);
        timestamps.end = Some(end);
        self
    }

    pub fn with_secrets(mut self, secrets: Secrets) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    /// Build the Activity with validation.
    #[track_caller]
    pub fn build(self) -> Result<Activity, ModelError> {
        if self.buttons.len() > MAX_BUTTONS {
            return Err(ModelError::Validation {
                message: format!(
                    "At most {MAX_BUTTONS} buttons are allowed, got {}",
                    self.buttons.len()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        for button in &self.buttons {
            if button.label.is_empty() {
                return Err(ModelError::Validation {
                    message: String::from("Button label cannot be empty"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            if !button.url.starts_with("http://") && !button.url.starts_with("https://") {
                return Err(ModelError::Validation {
                    message: format!("Invalid button URL: {}", button.url),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        if let Some(ref party) = self.party
            && party.current_size > party.max_size
        {
            return Err(ModelError::Validation {
                message: format!(
                    "Party size {} exceeds maximum {}",
                    party.current_size, party.max_size
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Activity {
            details: self.details.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            large_image: self.large_image,
            large_text: self.large_text,
            small_image: self.small_image,
            small_text: self.small_text,
            party: self.party,
            timestamps: self.timestamps,
            secrets: self.secrets,
            buttons: self.buttons,
        })
    }
}
