//! Shared building blocks for the presence workspace.
//!
//! Nothing in here knows about presence sessions or activities. The crate
//! only holds the pieces every other layer leans on:
//!
//! - [`ErrorLocation`]: call-site capture attached to every error variant
//! - [`human_bytes`]: base-1024 byte counts for status lines
//! - [`truncate_chars`]: char-aware truncation for display strings

pub mod error_location;
pub mod text;


pub use error_location::ErrorLocation;
pub use text::{human_bytes, truncate_chars};
