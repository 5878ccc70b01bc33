//! HTTP gateway (Axum) in front of the analysis pipeline.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{analyze_batch_handler, analyze_handler, index_handler};
pub use state::AppState;

use crate::constants::{API_KEY_HEADER, MODEL_VERSION};

pub fn create_router_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/analyze/batch", post(analyze_batch_handler))
        .route("/index", post(index_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rejects `/api` requests whose `X-API-Key` does not match the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !state.api_key_matches(presented) {
        debug!(
            key_present = presented.is_some(),
            key_configured = state.has_api_key(),
            "Rejected unauthenticated request"
        );
        return Err(GatewayError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    Json(HealthResponse {
        status: "healthy",
        version: MODEL_VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
    .into_response()
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub embedder_mode: &'static str,
    pub index_entries: usize,
    pub index_dimension: Option<usize>,
    pub metric: &'static str,
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let index = state.index();
    let embedder_mode = if index.is_embedder_stub() { "stub" } else { "real" };

    Json(ReadyResponse {
        status: "ready",
        embedder_mode,
        index_entries: index.len(),
        index_dimension: index.dimension(),
        metric: index.metric().as_str(),
    })
    .into_response()
}
