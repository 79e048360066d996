/// Mapping of relay errors onto HTTP responses
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::error;
use serde_json::json;

use crate::error::RainError;

/// Body returned when the oracle cannot produce a prediction.
const PREDICTION_FAILED: &str = "Failed to get AI prediction";

/// Error type returned by the facade's handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The prediction oracle failed or timed out.
    PredictionUnavailable(String),

    /// Anything else that went wrong while serving a request.
    InternalServerError(String),
}

impl From<RainError> for ApiError {
    fn from(err: RainError) -> Self {
        match err {
            RainError::UpstreamUnavailable(reason) => ApiError::PredictionUnavailable(reason),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = match self {
            ApiError::PredictionUnavailable(reason) => {
                error!("Error calling prediction oracle: {}", reason);
                json!({ "error": PREDICTION_FAILED })
            }
            ApiError::InternalServerError(reason) => {
                error!("Internal server error: {}", reason);
                json!({ "error": "An internal server error occurred" })
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
