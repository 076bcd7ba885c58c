//! Activity mapping: [`models::Activity`] to the `SET_ACTIVITY` wire shape.
//!
//! Optional substructures are left out of the JSON entirely when absent,
//! never sent as `null` or as empty objects.

mod mapper;

pub use mapper::map_activity;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WireActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<WireAssets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<WireTimestamps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<WireParty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<WireSecrets>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<WireButton>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WireAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

impl WireAssets {
    fn is_empty(&self) -> bool {
        self.large_image.is_none()
            && self.large_text.is_none()
            && self.small_image.is_none()
            && self.small_text.is_none()
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireTimestamps {
    pub start: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireParty {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// `[current, max]`
    pub size: [u32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WireSecrets {
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireButton {
    pub label: String,
    pub url: String,
}
