/// Rain event state machine applied to [`RainStatus`]
use log::info;
use time::OffsetDateTime;

use crate::models::{RainStatus, Reading};
use crate::telemetry::{DetailReport, TelemetryEvent};
use crate::utils::{format_datetime, mean_intensity};

impl RainStatus {
    /// Apply one decoded telemetry event at time `now`
    ///
    /// The whole update happens through `&mut self`, so a caller holding the
    /// write lock publishes it as a single step.
    pub fn apply(&mut self, event: &TelemetryEvent, now: OffsetDateTime) {
        match event {
            TelemetryEvent::Presence { raining } => self.apply_presence(*raining),
            TelemetryEvent::Detail(report) => self.apply_detail(report, now),
        }
    }

    /// Presence signal: sets the flag, and resets the event on every dry
    /// message, not just on the falling edge.
    fn apply_presence(&mut self, raining: bool) {
        if raining && !self.is_raining {
            info!("Rain detected");
        } else if !raining && self.is_raining {
            info!(
                "Rain stopped after {} readings (average intensity {:.2}%)",
                self.readings.len(),
                self.average_intensity
            );
        }

        self.is_raining = raining;

        if !raining {
            self.readings.clear();
            self.start_time = None;
            self.average_intensity = 0.0;
        }
    }

    fn apply_detail(&mut self, report: &DetailReport, now: OffsetDateTime) {
        self.intensity = report.intensity;
        self.duration = report.duration.clone();

        if !self.is_raining {
            return;
        }

        // First reading of the event; clear anything a delayed dry reset missed
        if self.start_time.is_none() {
            info!("Rain event started at {}", format_datetime(&now));
            self.start_time = Some(now);
            self.readings.clear();
        }

        self.readings.push(Reading {
            intensity: report.intensity,
            timestamp: now,
        });
        self.average_intensity = mean_intensity(&self.readings);
    }
}
