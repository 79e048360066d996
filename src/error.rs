/// Error taxonomy shared by the relay and the monitor
use thiserror::Error;

/// Why a detail payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("expected two fields separated by \", \"")]
    MissingSeparator,

    #[error("field {0:?} has no \": \" value marker")]
    MissingValueMarker(String),

    #[error("intensity {0:?} is not a finite number")]
    InvalidIntensity(String),

    #[error("payload is not valid UTF-8")]
    NotUtf8,
}

/// Errors raised anywhere in the rain relay.
///
/// None of these are fatal once the service loops are running: telemetry
/// errors drop a single event, transport errors wait for reconnection and
/// upstream errors are reported to the caller for that request only.
#[derive(Debug, Error)]
pub enum RainError {
    /// A telemetry payload could not be parsed.
    #[error("malformed telemetry: {0}")]
    MalformedTelemetry(#[from] MalformedReason),

    /// The MQTT broker connection or subscription failed.
    #[error("transport fault: {0}")]
    TransportFault(String),

    /// The prediction oracle failed, timed out or answered with garbage.
    #[error("prediction oracle unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The monitor could not fetch from the relay.
    #[error("relay backend request failed: {0}")]
    Backend(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<rumqttc::ConnectionError> for RainError {
    fn from(err: rumqttc::ConnectionError) -> Self {
        RainError::TransportFault(err.to_string())
    }
}

impl From<rumqttc::ClientError> for RainError {
    fn from(err: rumqttc::ClientError) -> Self {
        RainError::TransportFault(err.to_string())
    }
}
