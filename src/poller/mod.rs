/// Client-side refresh loop: status polling plus rain-only prediction polling
use log::{debug, error, info};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};

pub mod backend;
pub mod schedule;

pub use backend::{HttpBackend, RainBackend};
pub use schedule::{PredictionSchedule, ScheduleToken};

use crate::models::{RainStatus, ViewState};

/// Drives a [`ViewState`] from a [`RainBackend`]
///
/// The status tick is the only place that starts or stops the prediction
/// schedule, so there is never more than one prediction task.
pub struct Poller {
    backend: Arc<dyn RainBackend>,
    view: Arc<Mutex<ViewState>>,
    schedule: PredictionSchedule,
    prediction_interval: Duration,
}

impl Poller {
    pub fn new(backend: Arc<dyn RainBackend>, prediction_interval: Duration) -> Self {
        Poller {
            backend,
            view: Arc::new(Mutex::new(ViewState::default())),
            schedule: PredictionSchedule::new(),
            prediction_interval,
        }
    }

    /// Shared handle to the view, for whoever renders it
    pub fn view(&self) -> Arc<Mutex<ViewState>> {
        Arc::clone(&self.view)
    }

    pub fn prediction_active(&self) -> bool {
        self.schedule.is_active()
    }

    /// One status refresh
    ///
    /// A failed fetch leaves the view as it was, apart from ending the
    /// initial loading state.
    pub async fn tick(&mut self) {
        match self.backend.fetch_status().await {
            Ok(status) => self.apply_status(status).await,
            Err(e) => {
                error!("Error fetching data: {}", e);
                self.view.lock().await.loading = false;
            }
        }
    }

    async fn apply_status(&mut self, status: RainStatus) {
        if !status.is_raining {
            // Stop first so an in-flight prediction can no longer be stored
            if self.schedule.stop_if_present() {
                info!("Rain stopped, prediction polling cancelled");
            }

            let mut view = self.view.lock().await;
            view.status = Some(status.for_display());
            view.prediction = None;
            view.loading = false;
            return;
        }

        {
            let mut view = self.view.lock().await;
            view.status = Some(status);
            view.loading = false;
        }

        let backend = Arc::clone(&self.backend);
        let view = Arc::clone(&self.view);
        let period = self.prediction_interval;

        if self
            .schedule
            .start_if_absent(|token| prediction_loop(backend, view, token, period))
        {
            info!(
                "Rain detected, polling predictions every {}s",
                period.as_secs_f64()
            );
        }
    }

    /// Cancel the prediction task if it is running
    pub fn stop(&mut self) {
        if self.schedule.stop_if_present() {
            info!("Prediction polling cancelled");
        }
    }

    /// Poll every `status_interval` until `shutdown` resolves
    ///
    /// The first refresh happens immediately. Both the status loop and the
    /// prediction task are gone when this returns.
    pub async fn run<S>(mut self, status_interval: Duration, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut timer = interval(status_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => self.tick().await,
            }
        }

        self.stop();
    }
}

/// Fetch once right away, then every `period`, until aborted
async fn prediction_loop(
    backend: Arc<dyn RainBackend>,
    view: Arc<Mutex<ViewState>>,
    token: ScheduleToken,
    period: Duration,
) {
    refresh_prediction(backend.as_ref(), &view, &token).await;

    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        refresh_prediction(backend.as_ref(), &view, &token).await;
    }
}

async fn refresh_prediction(
    backend: &dyn RainBackend,
    view: &Mutex<ViewState>,
    token: &ScheduleToken,
) {
    match backend.fetch_prediction().await {
        Ok(prediction) => {
            let mut view = view.lock().await;
            if token.is_current() {
                view.prediction = Some(prediction);
            } else {
                debug!(
                    "Discarding prediction from cancelled schedule {}",
                    token.generation()
                );
            }
        }
        Err(e) => error!("Error fetching prediction: {}", e),
    }
}
