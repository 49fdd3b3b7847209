//! Task service trait definition.

use crate::dto::{
    DeletedRecord, Envelope, MutationResponse, TaskCriteria, TaskListOptions, TaskPayload,
};
use async_trait::async_trait;
use tasktrack_core::{Interface, Record, TrackResult};

/// Task use cases.
#[async_trait]
pub trait TaskService: Interface + Send + Sync {
    /// Lists one page of tasks, optionally scoped to an email.
    async fn list_tasks(
        &self,
        options: TaskListOptions,
        bypass: bool,
    ) -> TrackResult<Envelope<Vec<Record>>>;

    /// Lists every task, optionally scoped to an email. Always read fresh.
    async fn all_tasks(&self, options: TaskListOptions) -> TrackResult<Envelope<Vec<Record>>>;

    /// Gets a task by id.
    async fn get_task(&self, id: &str, bypass: bool) -> TrackResult<Envelope<Record>>;

    /// Gets the first task matching the criteria.
    async fn first_task(&self, criteria: TaskCriteria, expand: Option<String>) -> TrackResult<Record>;

    /// Creates a task. The payload must carry an email.
    async fn create_task(&self, payload: TaskPayload) -> TrackResult<MutationResponse<Record>>;

    /// Patches a task.
    async fn update_task(
        &self,
        id: &str,
        payload: TaskPayload,
    ) -> TrackResult<MutationResponse<Record>>;

    /// Deletes a task.
    async fn delete_task(&self, id: &str) -> TrackResult<MutationResponse<DeletedRecord>>;
}
