use crate::config::DisplayConfig;
use crate::metrics::MetricsSample;
use crate::snapshot::SystemSnapshot;

use common::human_bytes;
use models::{Activity, ActivityBuilder, Button, ModelError};

use std::time::SystemTime;

use url::Url;

const PASTE_BUTTON_LABEL: &str = "Full system info";

/// Display fields that stay fixed for the lifetime of the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceProfile {
    pub static_details: Option<String>,
    pub large_image: String,
    pub large_text: Option<String>,
    pub small_image: String,
    pub button: Option<Button>,
}

impl PresenceProfile {
    /// Profile without a system snapshot; details fall back to live metrics.
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            static_details: None,
            large_image: display.default_large_image.clone(),
            large_text: None,
            small_image: display.small_image.clone(),
            button: None,
        }
    }

    pub fn from_snapshot(snapshot: &SystemSnapshot, display: &DisplayConfig) -> Self {
        let details = snapshot.static_details(display.details_max_chars);

        Self {
            static_details: (!details.is_empty()).then_some(details),
            large_image: snapshot.image_key(&display.default_large_image),
            large_text: snapshot
                .large_text()
                .or(snapshot.user_host())
                .map(str::to_string),
            small_image: display.small_image.clone(),
            button: None,
        }
    }

    pub fn with_paste_url(mut self, url: &Url) -> Self {
        self.button = Some(Button::new(PASTE_BUTTON_LABEL, url.as_str()));
        self
    }

    /// Build this tick's activity from `sample`.
    pub fn activity(
        &self,
        sample: &MetricsSample,
        started_at: SystemTime,
    ) -> Result<Activity, ModelError> {
        let rx = human_bytes(sample.rx_bytes_per_sec as u64);
        let tx = human_bytes(sample.tx_bytes_per_sec as u64);

        let details = match &self.static_details {
            Some(details) => details.clone(),
            None => format!(
                "{:.0}% CPU • {:.0}% RAM • ↓ {rx}/s ↑ {tx}/s",
                sample.cpu_percent, sample.memory_percent
            ),
        };

        let mut builder = ActivityBuilder::default()
            .with_details(details)
            .with_state(format!(
                "CPU {:.0}% • RAM {:.0}%",
                sample.cpu_percent, sample.memory_percent
            ))
            .with_large_image(
                self.large_image.clone(),
                self.large_text.clone().unwrap_or_default(),
            )
            .with_small_image(
                self.small_image.clone(),
                format!("{:.0}% RAM • ↓ {rx}/s ↑ {tx}/s", sample.memory_percent),
            )
            .with_start(started_at);

        if let Some(button) = &self.button {
            builder = builder.with_button(button.clone());
        }

        builder.build()
    }
}
