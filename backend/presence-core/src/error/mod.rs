pub mod config;
pub mod ipc;
pub mod metrics;
pub mod snapshot;
pub mod upload;

pub use ipc::IpcError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ipc(#[from] ipc::IpcError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Metrics(#[from] metrics::MetricsError),

    #[error(transparent)]
    Snapshot(#[from] snapshot::SnapshotError),

    #[error(transparent)]
    Upload(#[from] upload::UploadError),

    #[error(transparent)]
    Model(#[from] models::ModelError),
}
