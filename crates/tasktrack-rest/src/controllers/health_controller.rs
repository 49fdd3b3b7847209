//! Health check controller.

use crate::{responses::health, state::AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tasktrack_service::ServiceStatus;

/// Routes served outside the API prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(liveness_check))
}

/// Routes served under the API prefix.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(combined_health))
}

/// Server status and version.
pub async fn root(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus::running(state.version))
}

/// Record store and cache probes; 503 when either is down.
pub async fn combined_health(State(state): State<AppState>) -> impl IntoResponse {
    health(state.health_service.check().await)
}

/// Liveness check endpoint.
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
