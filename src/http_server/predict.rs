/// `/ai-predict` handler: forwards current conditions to the oracle
use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use super::{ApiError, ApiState};

/// Relays the oracle's prediction for the latest intensity and duration.
///
/// Any request body is ignored; the oracle always sees the aggregator's own
/// view of the current conditions.
pub async fn predict(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let prediction = state.store.request_prediction(state.oracle.as_ref()).await?;
    Ok(Json(prediction))
}
