/// Client for the external rain prediction service
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::RainError;
use crate::models::PredictionRequest;

/// Anything that can turn current conditions into a prediction.
///
/// The answer is the oracle's JSON body as received; its shape is the
/// oracle's business, not the relay's.
#[async_trait]
pub trait PredictionOracle: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, RainError>;
}

/// Oracle reached over HTTP with a bounded request time.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    url: Url,
}

impl HttpOracle {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, RainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RainError::Config(format!("Failed to build oracle client: {}", e)))?;

        Ok(HttpOracle { client, url })
    }
}

#[async_trait]
impl PredictionOracle for HttpOracle {
    /// POST the request body and hand back the JSON answer untouched
    ///
    /// Connection errors, timeouts, non-2xx statuses and non-JSON bodies
    /// all become [`RainError::UpstreamUnavailable`]. No retries.
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, RainError> {
        debug!(
            "Requesting prediction for intensity={} duration={}",
            request.rain_intensity, request.duration
        );

        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| RainError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RainError::UpstreamUnavailable(format!(
                "oracle answered {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RainError::UpstreamUnavailable(e.to_string()))
    }
}
