//! Permission controller.

use crate::{
    extractors::{CacheMode, PermissionQuery},
    responses::{sourced, ReadResult},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use tasktrack_core::{Record, TrackError};
use tracing::debug;

/// Creates the permission router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(latest_permission))
}

/// Newest permission for `?email=`; `data` is null when there is none.
async fn latest_permission(
    State(state): State<AppState>,
    cache: CacheMode,
    Query(query): Query<PermissionQuery>,
) -> ReadResult<Option<Record>> {
    let email = query
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| TrackError::validation("Email is required"))?;
    debug!("Latest permission request: {}", email);

    sourced(
        state
            .permission_service
            .latest_permission(&email, cache.bypass)
            .await?,
    )
}
