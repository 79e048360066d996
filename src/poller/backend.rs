/// Where the monitor gets its status snapshots and predictions from
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::error::RainError;
use crate::models::{Prediction, RainStatus};

#[async_trait]
pub trait RainBackend: Send + Sync {
    async fn fetch_status(&self) -> Result<RainStatus, RainError>;
    async fn fetch_prediction(&self) -> Result<Prediction, RainError>;
}

/// The relay's HTTP facade.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    status_url: Url,
    predict_url: Url,
}

impl HttpBackend {
    /// `relay_url` is the facade's base URL, e.g. `http://localhost:4000`
    ///
    /// A path prefix is kept whether or not it ends in `/`.
    pub fn new(relay_url: &Url, timeout: Duration) -> Result<Self, RainError> {
        let mut base = relay_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| RainError::Config(format!("Invalid relay URL {}: {}", relay_url, e)))
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpBackend {
            client,
            status_url: join("status")?,
            predict_url: join("ai-predict")?,
        })
    }
}

#[async_trait]
impl RainBackend for HttpBackend {
    async fn fetch_status(&self) -> Result<RainStatus, RainError> {
        let response = self
            .client
            .get(self.status_url.clone())
            .send()
            .await
            .map_err(|e| RainError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RainError::Backend(format!(
                "status endpoint answered {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RainError::Backend(e.to_string()))
    }

    async fn fetch_prediction(&self) -> Result<Prediction, RainError> {
        let response = self
            .client
            .post(self.predict_url.clone())
            .send()
            .await
            .map_err(|e| RainError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RainError::UpstreamUnavailable(format!(
                "prediction endpoint answered {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RainError::UpstreamUnavailable(e.to_string()))
    }
}
