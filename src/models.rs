use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Duration label reported while no rain is falling.
pub const DRY_DURATION: &str = "0s";

/// A single intensity sample captured during a rain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub intensity: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Rolling summary of the current rain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainStatus {
    pub is_raining: bool,
    pub intensity: f64,
    pub duration: String,
    pub average_intensity: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    pub readings: Vec<Reading>,
}

impl Default for RainStatus {
    fn default() -> Self {
        RainStatus {
            is_raining: false,
            intensity: 0.0,
            duration: DRY_DURATION.to_string(),
            average_intensity: 0.0,
            start_time: None,
            readings: Vec::new(),
        }
    }
}

impl RainStatus {
    /// Copy of this status as a display should show it.
    ///
    /// While dry the last reported intensity and duration are stale, so they
    /// are replaced with zero and "0s". A wet status is returned unchanged.
    pub fn for_display(&self) -> RainStatus {
        if self.is_raining {
            return self.clone();
        }
        RainStatus {
            intensity: 0.0,
            duration: DRY_DURATION.to_string(),
            ..self.clone()
        }
    }
}

/// Body sent to the prediction oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub rain_intensity: f64,
    pub duration: String,
}

impl From<&RainStatus> for PredictionRequest {
    fn from(status: &RainStatus) -> Self {
        PredictionRequest {
            rain_intensity: status.intensity,
            duration: status.duration.clone(),
        }
    }
}

/// Oracle answer. Fields beyond the two known ones are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_remaining_minutes: f64,
    pub confidence: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What the display renders; refreshed by the monitor's poller.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub status: Option<RainStatus>,
    pub prediction: Option<Prediction>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            loading: true,
            status: None,
            prediction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_status_serializes_with_camel_case_and_null_start() {
        let value = serde_json::to_value(RainStatus::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "isRaining": false,
                "intensity": 0.0,
                "duration": "0s",
                "averageIntensity": 0.0,
                "startTime": null,
                "readings": [],
            })
        );
    }

    #[test]
    fn dry_status_is_masked_for_display() {
        let status = RainStatus {
            intensity: 60.0,
            duration: "10s".to_string(),
            ..RainStatus::default()
        };

        let shown = status.for_display();
        assert_eq!(shown.intensity, 0.0);
        assert_eq!(shown.duration, "0s");
        // The stored status keeps what the sensor last said.
        assert_eq!(status.intensity, 60.0);
        assert_eq!(status.duration, "10s");
    }

    #[test]
    fn wet_status_is_shown_as_is() {
        let status = RainStatus {
            is_raining: true,
            intensity: 35.5,
            duration: "42s".to_string(),
            ..RainStatus::default()
        };
        assert_eq!(status.for_display(), status);
    }

    #[test]
    fn prediction_keeps_unknown_oracle_fields() {
        let body = json!({
            "predicted_remaining_minutes": 12.5,
            "confidence": "high",
            "model": "gbr-v2",
        });
        let prediction: Prediction = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(prediction.predicted_remaining_minutes, 12.5);
        assert_eq!(prediction.confidence, "high");
        assert_eq!(serde_json::to_value(&prediction).unwrap(), body);
    }

    #[test]
    fn status_round_trips_through_json_with_timestamps() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let status = RainStatus {
            is_raining: true,
            intensity: 40.0,
            duration: "5s".to_string(),
            average_intensity: 40.0,
            start_time: Some(now),
            readings: vec![Reading {
                intensity: 40.0,
                timestamp: now,
            }],
        };
        let text = serde_json::to_string(&status).unwrap();
        assert!(text.contains("\"startTime\":\"2023-11-14T22:13:20Z\""));
        let back: RainStatus = serde_json::from_str(&text).unwrap();
        assert_eq!(back, status);
    }
}
