//! Task controller.

use crate::{
    controllers::health_controller::combined_health,
    extractors::{CacheMode, FirstTaskQuery, TaskListQuery, ValidatedJson},
    responses::{mutation, sourced, AppError, ReadResult, WriteResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tasktrack_core::Record;
use tasktrack_service::{DeletedRecord, TaskPayload};
use tracing::debug;

/// Creates the task router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/all", get(all_tasks))
        .route("/first", get(first_task))
        .route("/health", get(combined_health))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

/// One page of tasks, optionally scoped to an email.
async fn list_tasks(
    State(state): State<AppState>,
    cache: CacheMode,
    Query(query): Query<TaskListQuery>,
) -> ReadResult<Vec<Record>> {
    debug!("List tasks request: {:?}", query.email);
    sourced(state.task_service.list_tasks(query.into(), cache.bypass).await?)
}

/// Every task, read fresh.
async fn all_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> ReadResult<Vec<Record>> {
    debug!("List all tasks request: {:?}", query.email);
    sourced(state.task_service.all_tasks(query.into()).await?)
}

/// First task matching email/status/title.
async fn first_task(
    State(state): State<AppState>,
    Query(query): Query<FirstTaskQuery>,
) -> Result<Json<Record>, AppError> {
    let (criteria, expand) = query.into_parts();
    Ok(Json(state.task_service.first_task(criteria, expand).await?))
}

async fn get_task(
    State(state): State<AppState>,
    cache: CacheMode,
    Path(id): Path<String>,
) -> ReadResult<Record> {
    debug!("Get task request: {}", id);
    sourced(state.task_service.get_task(&id, cache.bypass).await?)
}

async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TaskPayload>,
) -> WriteResult<Record> {
    debug!("Create task request: {:?}", payload.email);
    mutation(state.task_service.create_task(payload).await?)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<TaskPayload>,
) -> WriteResult<Record> {
    debug!("Update task request: {}", id);
    mutation(state.task_service.update_task(&id, payload).await?)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WriteResult<DeletedRecord> {
    debug!("Delete task request: {}", id);
    mutation(state.task_service.delete_task(&id).await?)
}
