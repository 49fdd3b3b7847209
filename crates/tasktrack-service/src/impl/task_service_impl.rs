//! Task service implementation.

use crate::dto::{
    DeletedRecord, Envelope, MutationResponse, TaskCriteria, TaskListOptions, TaskPayload,
};
use crate::invalidation::{InvalidationCoordinator, WriteKind};
use crate::query_service::QueryService;
use crate::task_service::TaskService;
use async_trait::async_trait;
use std::sync::Arc;
use tasktrack_core::{email_of, Collection, Record, Scope, TrackError, TrackResult, ValidateExt};
use tracing::{debug, error, info};

const TASKS: Collection = Collection::TASK;

/// Task service backed by the cache-aside query service.
pub struct TaskServiceImpl {
    queries: Arc<QueryService>,
    invalidation: Arc<InvalidationCoordinator>,
}

impl TaskServiceImpl {
    /// Creates a new task service.
    #[must_use]
    pub fn new(queries: Arc<QueryService>, invalidation: Arc<InvalidationCoordinator>) -> Self {
        Self {
            queries,
            invalidation,
        }
    }
}

#[async_trait]
impl TaskService for TaskServiceImpl {
    async fn list_tasks(
        &self,
        options: TaskListOptions,
        bypass: bool,
    ) -> TrackResult<Envelope<Vec<Record>>> {
        let scope = Scope::from_email(options.email.as_deref());
        debug!("Listing tasks for {} (bypass: {})", scope, bypass);

        let query = options.to_query()?;

        // The list key carries only the scope, so other windows skip the cache.
        let bypass = bypass || !options.is_default_window();
        self.queries.get_page(TASKS, &scope, query, bypass).await
    }

    async fn all_tasks(&self, options: TaskListOptions) -> TrackResult<Envelope<Vec<Record>>> {
        let scope = Scope::from_email(options.email.as_deref());
        debug!("Listing all tasks for {}", scope);

        let query = options.to_query()?;
        self.queries.get_full(TASKS, &scope, query, true).await
    }

    async fn get_task(&self, id: &str, bypass: bool) -> TrackResult<Envelope<Record>> {
        debug!("Getting task: {}", id);
        self.queries.get_by_id(TASKS, id, bypass).await
    }

    async fn first_task(&self, criteria: TaskCriteria, expand: Option<String>) -> TrackResult<Record> {
        let filter = criteria.to_filter();
        self.queries
            .get_first(TASKS, &filter, expand.as_deref())
            .await
    }

    async fn create_task(&self, payload: TaskPayload) -> TrackResult<MutationResponse<Record>> {
        payload.validate_request()?;
        if payload
            .email
            .as_deref()
            .map_or(true, |email| email.trim().is_empty())
        {
            return Err(TrackError::validation("email: Email is required"));
        }

        let data = payload.into_record_data()?;
        let record = self.queries.store().create(TASKS, &data).await.map_err(|e| {
            error!("Error creating task: {}", e);
            e
        })?;

        let report = self
            .invalidation
            .on_write(TASKS, WriteKind::Create, &record.id, email_of(&data))
            .await;
        report.log(TASKS);

        info!(
            "Task {} created and cache invalidated for email: {}",
            record.id,
            record.email().unwrap_or("unknown")
        );
        Ok(MutationResponse::created(TASKS, record))
    }

    async fn update_task(
        &self,
        id: &str,
        payload: TaskPayload,
    ) -> TrackResult<MutationResponse<Record>> {
        payload.validate_request()?;

        let data = payload.into_record_data()?;
        let (previous, record) = self
            .queries
            .store()
            .update_returning_previous(TASKS, id, &data)
            .await
            .map_err(|e| {
                error!("Error updating task {}: {}", id, e);
                e
            })?;

        // Both the scope the task left and the one it landed in are stale.
        let emails = previous.email().into_iter().chain(record.email());
        let report = self
            .invalidation
            .on_write(TASKS, WriteKind::Update, id, emails)
            .await;
        report.log(TASKS);

        info!(
            "Task {} updated and cache invalidated for email: {}",
            id,
            record.email().unwrap_or("unknown")
        );
        Ok(MutationResponse::updated(TASKS, record))
    }

    async fn delete_task(&self, id: &str) -> TrackResult<MutationResponse<DeletedRecord>> {
        let deleted = self
            .queries
            .store()
            .delete_returning(TASKS, id)
            .await
            .map_err(|e| {
                error!("Error deleting task {}: {}", id, e);
                e
            })?;

        let report = self
            .invalidation
            .on_write(TASKS, WriteKind::Delete, id, deleted.email())
            .await;
        report.log(TASKS);

        info!(
            "Task {} deleted and cache invalidated for email: {}",
            id,
            deleted.email().unwrap_or("unknown")
        );
        Ok(MutationResponse::deleted(
            TASKS,
            DeletedRecord { id: deleted.id },
        ))
    }
}

impl std::fmt::Debug for TaskServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::dto::Source;
    use std::time::Duration;
    use tasktrack_store::InMemoryRecordStore;

    fn service() -> TaskServiceImpl {
        let store = Arc::new(InMemoryRecordStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let queries = Arc::new(QueryService::new(store, cache.clone(), Duration::from_secs(300)));
        let invalidation = Arc::new(InvalidationCoordinator::new(cache, false));
        TaskServiceImpl::new(queries, invalidation)
    }

    fn payload(email: Option<&str>, title: &str) -> TaskPayload {
        TaskPayload {
            email: email.map(ToString::to_string),
            title: Some(title.to_string()),
            ..TaskPayload::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_email() {
        let err = service()
            .create_task(payload(None, "No owner"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_returns_201_response() {
        let response = service()
            .create_task(payload(Some("a@x.com"), "Write docs"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 201);
        assert_eq!(response.data.email(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_all_tasks_always_bypasses_cache() {
        let service = service();
        service
            .create_task(payload(Some("a@x.com"), "One"))
            .await
            .unwrap();

        for _ in 0..2 {
            let envelope = service.all_tasks(TaskListOptions::default()).await.unwrap();
            assert_eq!(envelope.source, Source::DatabaseBypassed);
            assert_eq!(envelope.data.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_delete_returns_id() {
        let service = service();
        let created = service
            .create_task(payload(Some("a@x.com"), "Doomed"))
            .await
            .unwrap()
            .data;

        let response = service.delete_task(&created.id).await.unwrap();
        assert_eq!(response.data.id, created.id);
        assert_eq!(response.message, "task deleted successfully");

        assert!(service.delete_task(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_first_task_by_criteria() {
        let service = service();
        service
            .create_task(payload(Some("a@x.com"), "Alpha"))
            .await
            .unwrap();

        let criteria = TaskCriteria {
            title: Some("Alpha".to_string()),
            ..TaskCriteria::default()
        };
        let record = service.first_task(criteria, None).await.unwrap();
        assert_eq!(record.email(), Some("a@x.com"));
    }
}
