use log::info;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::RainError;

const DEFAULT_MQTT_PORT: u16 = 8883;
const DEFAULT_PRESENCE_TOPIC: &str = "RainSensorData";
const DEFAULT_DETAIL_TOPIC: &str = "RainSensorData/aiData";
const DEFAULT_TRIGGER: &str = "Raining";
const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:4000";
const DEFAULT_ORACLE_URL: &str = "http://localhost:5000/ai-predict";
const DEFAULT_RELAY_URL: &str = "http://localhost:4000";

/// Broker credentials; both parts are required together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub credentials: Option<MqttCredentials>,
    pub use_tls: bool,
    pub presence_topic: String,
    pub detail_topic: String,
    pub reconnect_delay: Duration,
}

/// Settings for the `rain-relay` process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub mqtt: MqttConfig,
    pub presence_trigger: String,
    pub listen_address: String,
    pub oracle_url: Url,
    pub oracle_timeout: Duration,
    pub telemetry_buffer: usize,
}

/// Settings for the `rain-monitor` process.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub relay_url: Url,
    pub status_interval: Duration,
    pub prediction_interval: Duration,
    pub request_timeout: Duration,
}

impl RelayConfig {
    pub fn new() -> Result<Self, RainError> {
        // Load environment variables
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MQTT_HOST")
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| RainError::Config("MQTT_HOST environment variable not set".into()))?;

        let credentials = match (lookup("MQTT_USERNAME"), lookup("MQTT_PASSWORD")) {
            (Some(username), Some(password)) => Some(MqttCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(RainError::Config(
                    "MQTT_USERNAME and MQTT_PASSWORD must be set together".into(),
                ))
            }
        };

        let mqtt = MqttConfig {
            host,
            port: parse_or(&lookup, "MQTT_PORT", DEFAULT_MQTT_PORT)?,
            client_id: lookup("MQTT_CLIENT_ID").unwrap_or_else(|| "rain-relay".to_string()),
            credentials,
            use_tls: parse_or(&lookup, "MQTT_TLS", true)?,
            presence_topic: lookup("PRESENCE_TOPIC")
                .unwrap_or_else(|| DEFAULT_PRESENCE_TOPIC.to_string()),
            detail_topic: lookup("DETAIL_TOPIC").unwrap_or_else(|| DEFAULT_DETAIL_TOPIC.to_string()),
            reconnect_delay: Duration::from_secs(parse_or(&lookup, "RECONNECT_DELAY_SECS", 5)?),
        };

        if mqtt.presence_topic == mqtt.detail_topic {
            return Err(RainError::Config(
                "PRESENCE_TOPIC and DETAIL_TOPIC must differ".into(),
            ));
        }

        let telemetry_buffer: usize = parse_or(&lookup, "TELEMETRY_BUFFER", 256)?;
        if telemetry_buffer == 0 {
            return Err(RainError::Config("TELEMETRY_BUFFER must be positive".into()));
        }

        let config = RelayConfig {
            mqtt,
            presence_trigger: lookup("PRESENCE_TRIGGER")
                .unwrap_or_else(|| DEFAULT_TRIGGER.to_string()),
            listen_address: lookup("HTTP_LISTEN_ADDRESS")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string()),
            oracle_url: parse_url(&lookup, "ORACLE_URL", DEFAULT_ORACLE_URL)?,
            oracle_timeout: Duration::from_secs(parse_or(&lookup, "ORACLE_TIMEOUT_SECS", 10)?),
            telemetry_buffer,
        };

        info!(
            "Relay configured: broker {}:{} (tls={}), topics [{}, {}], oracle {}",
            config.mqtt.host,
            config.mqtt.port,
            config.mqtt.use_tls,
            config.mqtt.presence_topic,
            config.mqtt.detail_topic,
            config.oracle_url
        );

        Ok(config)
    }
}

impl MonitorConfig {
    pub fn new() -> Result<Self, RainError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let status_secs: u64 = parse_or(&lookup, "STATUS_INTERVAL_SECS", 2)?;
        let prediction_secs: u64 = parse_or(&lookup, "PREDICTION_INTERVAL_SECS", 5)?;

        if status_secs == 0 {
            return Err(RainError::Config("STATUS_INTERVAL_SECS must be positive".into()));
        }
        if prediction_secs <= status_secs {
            return Err(RainError::Config(format!(
                "PREDICTION_INTERVAL_SECS ({}) must be longer than STATUS_INTERVAL_SECS ({})",
                prediction_secs, status_secs
            )));
        }

        Ok(MonitorConfig {
            relay_url: parse_url(&lookup, "RELAY_URL", DEFAULT_RELAY_URL)?,
            status_interval: Duration::from_secs(status_secs),
            prediction_interval: Duration::from_secs(prediction_secs),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 5)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, RainError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RainError::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

fn parse_url<F>(lookup: &F, key: &str, default: &str) -> Result<Url, RainError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| RainError::Config(format!("{} is not a valid URL: {}", key, e)))
}
