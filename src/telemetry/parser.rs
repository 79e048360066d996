/// Decoding of raw rain sensor messages into typed telemetry events
use crate::error::{MalformedReason, RainError};

const FIELD_SEPARATOR: &str = ", ";
const VALUE_MARKER: &str = ": ";

/// Which sensor channel a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Binary raining / not raining signal.
    Presence,
    /// Periodic intensity and duration report.
    Detail,
}

/// A message as delivered by the transport, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryMessage {
    pub channel: Channel,
    pub payload: Vec<u8>,
}

impl TelemetryMessage {
    pub fn new(channel: Channel, payload: impl Into<Vec<u8>>) -> Self {
        TelemetryMessage {
            channel,
            payload: payload.into(),
        }
    }
}

/// Intensity and duration carried by a detail message.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailReport {
    pub intensity: f64,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Presence { raining: bool },
    Detail(DetailReport),
}

/// Decode a transport message into a telemetry event
///
/// Presence payloads compare byte-for-byte against `trigger`; anything else,
/// including invalid UTF-8, means "not raining". Detail payloads go through
/// [`parse_detail`].
pub fn decode_message(msg: &TelemetryMessage, trigger: &str) -> Result<TelemetryEvent, RainError> {
    match msg.channel {
        Channel::Presence => Ok(TelemetryEvent::Presence {
            raining: msg.payload == trigger.as_bytes(),
        }),
        Channel::Detail => {
            let text = std::str::from_utf8(&msg.payload).map_err(|_| MalformedReason::NotUtf8)?;
            Ok(TelemetryEvent::Detail(parse_detail(text)?))
        }
    }
}

/// Parse a detail payload of the form `Intensity: 40%, Duration: 12s`
///
/// The payload is split on the first `", "` into an intensity field and a
/// duration field; each field is split on its first `": "` into label and
/// value. Labels are not checked by name. The intensity value may carry a
/// trailing `%` and must be a finite number. The duration value is kept
/// verbatim, including anything after a further separator.
///
/// # Returns
/// The parsed report, or the reason the payload was rejected
pub fn parse_detail(payload: &str) -> Result<DetailReport, MalformedReason> {
    let (intensity_field, duration_field) = payload
        .split_once(FIELD_SEPARATOR)
        .ok_or(MalformedReason::MissingSeparator)?;

    let intensity_text = field_value(intensity_field)?;
    let duration = field_value(duration_field)?;

    let trimmed = intensity_text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let intensity: f64 = number
        .parse()
        .map_err(|_| MalformedReason::InvalidIntensity(intensity_text.to_string()))?;

    // "inf" and "NaN" parse fine but cannot be averaged
    if !intensity.is_finite() {
        return Err(MalformedReason::InvalidIntensity(intensity_text.to_string()));
    }

    Ok(DetailReport {
        intensity,
        duration: duration.to_string(),
    })
}

fn field_value(field: &str) -> Result<&str, MalformedReason> {
    field
        .split_once(VALUE_MARKER)
        .map(|(_, value)| value)
        .ok_or_else(|| MalformedReason::MissingValueMarker(field.to_string()))
}
