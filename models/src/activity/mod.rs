//! Activity value types.
//!
//! An [`Activity`] is built fresh for every update and compared by value; it
//! has no identity of its own.

pub mod builder;

use std::time::SystemTime;

/// Upper bound on buttons the remote application will render.
pub const MAX_BUTTONS: usize = 2;

/// Status shown by the remote application for this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    pub details: String,
    pub state: String,
    pub large_image: Option<String>,
    pub large_text: Option<String>,
    pub small_image: Option<String>,
    pub small_text: Option<String>,
    pub party: Option<Party>,
    pub timestamps: Option<Timestamps>,
    pub secrets: Option<Secrets>,
    pub buttons: Vec<Button>,
}

/// Elapsed/remaining time markers.
///
/// `end` is only meaningful together with `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamps {
    pub start: Option<SystemTime>,
    pub end: Option<SystemTime>,
}

impl Timestamps {
    pub fn started_at(start: SystemTime) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub id: String,
    pub current_size: u32,
    pub max_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub match_secret: String,
    pub join: String,
    pub spectate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub url: String,
}

impl Button {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}
