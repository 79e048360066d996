/// `/status` and `/health` handlers
use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::ApiState;
use crate::models::RainStatus;

/// Current rain status, exactly as the aggregator holds it.
pub async fn status(State(state): State<ApiState>) -> Json<RainStatus> {
    Json(state.store.snapshot().await)
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
