use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MetricsError {
    #[error("Sample Error: {message} {location}")]
    Sample {
        message: String,
        location: ErrorLocation,
    },
}
