/// Text rendering of the monitor's view state
use crate::models::ViewState;
use crate::utils::format_datetime;

/// Lines describing `view`, in display order
pub fn render(view: &ViewState) -> Vec<String> {
    if view.loading {
        return vec!["Loading...".to_string()];
    }

    let Some(status) = &view.status else {
        return vec!["No rain data available".to_string()];
    };

    let mut lines = vec![format!(
        "Status: {}",
        if status.is_raining { "Raining" } else { "Dry" }
    )];
    lines.push(format!("  Current intensity: {}%", status.intensity));
    lines.push(format!("  Current duration: {}", status.duration));

    if let Some(start) = &status.start_time {
        lines.push(format!(
            "  Event started: {} ({} readings, average {:.2}%)",
            format_datetime(start),
            status.readings.len(),
            status.average_intensity
        ));
    }

    if let Some(prediction) = &view.prediction {
        lines.push(format!(
            "  Predicted rain duration: {} minutes",
            prediction.predicted_remaining_minutes
        ));
        lines.push(format!("  Confidence: {}", prediction.confidence));
    }

    lines
}
