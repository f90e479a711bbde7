mod logger;

use botfleet_core::gateway::FleetGateway;
use botfleet_error::{FleetError, FleetResult};
use botfleet_models::{constants::DEFAULT_CONFIG_FILE_NAME, settings::Settings};
use clap::Parser;
use logger::Logger;
use std::{env::current_dir, path::PathBuf};
use tracing::info;

/// Botfleet - robot fleet synchronization server
///
/// Keeps a fleet of field robots in sync with the cloud over MQTT:
/// presence-triggered resync, command dispatch, container deployment and
/// telemetry ingest, multi-tenant throughout.
#[derive(Parser)]
#[command(name = "botfleet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Botfleet sync server", long_about = None)]
struct Cli {
    /// Sets a custom config file with full path
    ///
    /// If not specified, the server looks for 'botfleet.toml' in the
    /// current working directory.
    #[arg(short, long, env = "BOTFLEET_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> FleetResult<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(p) => p,
        None => {
            let dir = current_dir()
                .map_err(|e| FleetError::from(format!("Failed to get current directory: {e}")))?;
            dir.join(DEFAULT_CONFIG_FILE_NAME)
        }
    };

    let settings = Settings::new(config_path.to_string_lossy().to_string())?;

    let mut logger = Logger::from_settings(&settings.log)?;
    logger.initialize(&settings.log.directory)?;

    let gateway = FleetGateway::start(&settings).await?;
    info!("botfleet server is up, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| FleetError::from(format!("Failed to listen for shutdown signal: {e}")))?;

    gateway.shutdown().await
}
