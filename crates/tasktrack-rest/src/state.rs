//! Application state for Axum handlers.

use std::sync::Arc;
use tasktrack_service::{HealthService, PermissionService, TaskService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub task_service: Arc<dyn TaskService>,
    pub permission_service: Arc<dyn PermissionService>,
    pub health_service: Arc<dyn HealthService>,
    /// Version reported by the root route.
    pub version: String,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        task_service: Arc<dyn TaskService>,
        permission_service: Arc<dyn PermissionService>,
        health_service: Arc<dyn HealthService>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            task_service,
            permission_service,
            health_service,
            version: version.into(),
        }
    }
}
