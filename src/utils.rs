/// Utility functions for averaging and formatting
use time::{format_description, OffsetDateTime};

use crate::models::Reading;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format.
/// Falls back to the default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Arithmetic mean of the intensities of `readings`
///
/// Always recomputed from the full slice rather than updated incrementally,
/// so the result cannot drift from the readings it summarises.
///
/// # Returns
/// The mean intensity, or 0 for an empty slice
pub fn mean_intensity(readings: &[Reading]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }

    let total: f64 = readings.iter().map(|r| r.intensity).sum();
    total / readings.len() as f64
}
