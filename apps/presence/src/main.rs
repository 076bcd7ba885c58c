use presence::app::{load_config, run};
use presence::cli::Cli;
use presence::error::PresenceError;
use presence::logger::initialize as LoggerInitialize;

use presence_core::config::default_log_dir;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: Cli) -> Result<(), PresenceError> {
    let log_dir = match &cli.log_dir {
        Some(dir) => dir.clone(),
        None => default_log_dir()?,
    };

    // Ensure log directory exists
    create_dir_all(&log_dir).map_err(|e| PresenceError::Presence {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Presence starting");
    info!("Log directory: {}", log_dir.display());

    let config = load_config(&cli)?;

    run(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
}
