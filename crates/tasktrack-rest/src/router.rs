//! Main application router.

use crate::{
    controllers::{health_controller, permission_controller, task_controller},
    middleware::logging_middleware,
    state::AppState,
};
use axum::{middleware, Router};
use tasktrack_config::ServerConfig;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Creates the application router.
///
/// Task, permission, and health routes are nested under
/// `server_config.api_prefix`; `/` and `/live` stay at the root.
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    let cors = create_cors_layer(server_config);

    let api_router = Router::new()
        .nest("/tasks", task_controller::router())
        .nest("/permissions", permission_controller::router())
        .merge(health_controller::api_router());

    let prefix = normalize_prefix(&server_config.api_prefix);
    let routes = match prefix.as_deref() {
        Some(prefix) => Router::new().nest(prefix, api_router),
        None => api_router,
    };

    let router = routes
        .merge(health_controller::router())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    info!(
        "Router created with task and permission endpoints under {}",
        prefix.as_deref().unwrap_or("/")
    );
    router
}

/// `"api"`, `"/api/"` and `"/api"` all become `"/api"`; blank or `/` means no prefix.
fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api").as_deref(), Some("/api"));
        assert_eq!(normalize_prefix("api/").as_deref(), Some("/api"));
        assert_eq!(normalize_prefix("/v1/api").as_deref(), Some("/v1/api"));
        assert_eq!(normalize_prefix("/"), None);
        assert_eq!(normalize_prefix(""), None);
    }
}
