pub mod aggregator;
pub mod config;
pub mod display;
pub mod error;
pub mod http_server;
pub mod models;
pub mod oracle;
pub mod poller;
pub mod telemetry;
pub mod utils;

/// Logging setup shared by both binaries
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();
}
