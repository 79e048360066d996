use log::{error, info};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};

use rain_relay::config::MonitorConfig;
use rain_relay::display::render;
use rain_relay::init_logging;
use rain_relay::poller::{HttpBackend, Poller};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = match MonitorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Monitoring rain relay at {}", config.relay_url);

    let backend = HttpBackend::new(&config.relay_url, config.request_timeout)?;
    let poller = Poller::new(Arc::new(backend), config.prediction_interval);
    let view = poller.view();
    let status_interval = config.status_interval;

    // Re-render whenever the view changes, on the status cadence
    let renderer = tokio::spawn(async move {
        let mut timer = interval(status_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<Vec<String>> = None;
        loop {
            timer.tick().await;
            let lines = render(&*view.lock().await);
            if last.as_ref() != Some(&lines) {
                for line in &lines {
                    info!("{}", line);
                }
                last = Some(lines);
            }
        }
    });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    poller.run(status_interval, shutdown).await;
    renderer.abort();

    info!("Monitor terminated by user. Exiting gracefully.");
    Ok(())
}
