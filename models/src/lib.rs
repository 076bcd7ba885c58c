//! Domain models for presence updates.
//!
//! This crate holds the plain values a caller hands to the presence session.
//! Models carry no transport knowledge: turning an [`Activity`] into bytes on
//! the wire is the job of `presence-core`.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **presence-core**: Transport, session and scheduling built on the models
//! - **presence**: Executable wiring everything together

pub mod activity;
pub mod error;


pub use activity::builder::ActivityBuilder;
pub use activity::{Activity, Button, MAX_BUTTONS, Party, Secrets, Timestamps};
pub use error::model_error::ModelError;
