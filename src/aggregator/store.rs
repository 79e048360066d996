/// Shared rain status, its single writer and the read-side facade
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{mpsc, RwLock};

use crate::error::RainError;
use crate::models::{PredictionRequest, RainStatus};
use crate::oracle::PredictionOracle;
use crate::telemetry::{decode_message, TelemetryMessage};

/// Owned handle to the process' rain status
///
/// Clones share the same state. Only [`StatusStore::ingest`] writes to it;
/// everything else reads through [`StatusStore::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    inner: Arc<RwLock<RainStatus>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy taken under the read lock
    pub async fn snapshot(&self) -> RainStatus {
        self.inner.read().await.clone()
    }

    /// Decode and apply one message
    ///
    /// A malformed message is returned as an error and leaves the status
    /// untouched.
    pub async fn ingest(&self, msg: &TelemetryMessage, trigger: &str) -> Result<(), RainError> {
        let event = decode_message(msg, trigger)?;

        let mut status = self.inner.write().await;
        status.apply(&event, OffsetDateTime::now_utc());
        debug!("Updated status: {:?}", *status);

        Ok(())
    }

    /// Ask the oracle about the current conditions
    ///
    /// The lock is released before the oracle is contacted, so a slow oracle
    /// never blocks ingestion. The oracle's body comes back as is.
    pub async fn request_prediction(
        &self,
        oracle: &dyn PredictionOracle,
    ) -> Result<Value, RainError> {
        let request = PredictionRequest::from(&self.snapshot().await);
        oracle.predict(&request).await
    }
}

/// Consume telemetry messages in arrival order until the channel closes
///
/// This task is the only writer of the store. Bad messages are logged and
/// dropped; they never stop the loop.
pub async fn run_ingestion(
    mut rx: mpsc::Receiver<TelemetryMessage>,
    store: StatusStore,
    trigger: String,
) {
    info!("Telemetry ingestion started");

    while let Some(msg) = rx.recv().await {
        if let Err(e) = store.ingest(&msg, &trigger).await {
            warn!(
                "Dropping {:?} message '{}': {}",
                msg.channel,
                String::from_utf8_lossy(&msg.payload),
                e
            );
        }
    }

    info!("Telemetry channel closed, ingestion stopped");
}
