/// HTTP facade over the aggregator: status snapshot and prediction relay
use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

mod error;
mod predict;
mod status;

pub use error::ApiError;

use crate::aggregator::StatusStore;
use crate::error::RainError;
use crate::oracle::PredictionOracle;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub store: StatusStore,
    pub oracle: Arc<dyn PredictionOracle>,
}

/// Lets a browser display on another origin poll the facade.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route("/ai-predict", post(predict::predict))
        // Matched routes only, unknown paths keep their 404
        .route_layer(cors_layer())
        .with_state(state)
}

/// Serve the facade on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), RainError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Backend server running on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .await
        .map_err(|e| RainError::TransportFault(format!("HTTP server failed: {}", e)))
}

/// Bind `listen_address` and serve the facade
pub async fn run_server(listen_address: &str, state: ApiState) -> Result<(), RainError> {
    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| RainError::Config(format!("Failed to bind {}: {}", listen_address, e)))?;

    serve(listener, state).await
}
