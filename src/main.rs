use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;

use rain_relay::aggregator::{run_ingestion, StatusStore};
use rain_relay::config::RelayConfig;
use rain_relay::http_server::{self, ApiState};
use rain_relay::init_logging;
use rain_relay::oracle::HttpOracle;
use rain_relay::telemetry::run_mqtt_ingress;

async fn run_relay(config: RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting rain relay");

    let store = StatusStore::new();
    let oracle = HttpOracle::new(config.oracle_url.clone(), config.oracle_timeout)?;

    // Single writer: only the ingestion task mutates the store
    let (tx, rx) = mpsc::channel(config.telemetry_buffer);
    let ingestion = tokio::spawn(run_ingestion(
        rx,
        store.clone(),
        config.presence_trigger.clone(),
    ));

    let state = ApiState {
        store,
        oracle: Arc::new(oracle),
    };

    tokio::select! {
        result = run_mqtt_ingress(&config.mqtt, tx) => result?,
        result = http_server::run_server(&config.listen_address, state) => result?,
    }

    ingestion.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration
    let config = match RelayConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Run until either service stops or Ctrl+C arrives
    tokio::select! {
        result = run_relay(config) => {
            match result {
                Ok(_) => info!("Relay stopped"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Relay terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
