//! Shared fixtures for service integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tasktrack_core::{
    Collection, Filter, ListQuery, Record, RecordData, RecordPage, TrackError, TrackResult,
};
use tasktrack_service::{
    CacheInterface, ComponentHealth, InMemoryCache, InvalidationCoordinator, QueryService,
    TaskPayload, TaskServiceImpl,
};
use tasktrack_store::{InMemoryRecordStore, RecordStore};

pub const TTL: Duration = Duration::from_secs(300);

/// Task service wired over in-memory backends, with handles on both.
pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub cache: Arc<InMemoryCache>,
    pub tasks: TaskServiceImpl,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_id_invalidation(false)
    }

    pub fn with_id_invalidation(invalidate_by_id: bool) -> Self {
        let store = Arc::new(FlakyStore::default());
        let cache = Arc::new(InMemoryCache::new());
        let queries = Arc::new(QueryService::new(store.clone(), cache.clone(), TTL));
        let invalidation = Arc::new(InvalidationCoordinator::new(cache.clone(), invalidate_by_id));

        Self {
            store,
            cache,
            tasks: TaskServiceImpl::new(queries, invalidation),
        }
    }

    pub async fn is_cached(&self, key: &str) -> bool {
        self.cache.get_raw(key).await.unwrap().is_some()
    }
}

pub fn task(id: &str, email: &str, title: &str) -> Record {
    let mut fields = RecordData::new();
    fields.insert("email".to_string(), json!(email));
    fields.insert("title".to_string(), json!(title));
    Record::new(id, fields)
}

pub fn payload(email: &str, title: &str) -> TaskPayload {
    TaskPayload {
        email: Some(email.to_string()),
        title: Some(title.to_string()),
        ..TaskPayload::default()
    }
}

/// In-memory store whose list reads can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryRecordStore,
    fail_lists: AtomicBool,
}

impl FlakyStore {
    pub fn seed(&self, record: Record) {
        self.inner.insert(Collection::TASK, record);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.inner.read_count()
    }

    fn check(&self) -> TrackResult<()> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(TrackError::record_store(Some(500), "upstream unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn list(&self, collection: Collection, query: &ListQuery) -> TrackResult<RecordPage> {
        self.check()?;
        self.inner.list(collection, query).await
    }

    async fn full_list(&self, collection: Collection, query: &ListQuery) -> TrackResult<Vec<Record>> {
        self.check()?;
        self.inner.full_list(collection, query).await
    }

    async fn first(
        &self,
        collection: Collection,
        filter: &Filter,
        expand: Option<&str>,
    ) -> TrackResult<Record> {
        self.inner.first(collection, filter, expand).await
    }

    async fn get_one(&self, collection: Collection, id: &str) -> TrackResult<Record> {
        self.inner.get_one(collection, id).await
    }

    async fn create(&self, collection: Collection, data: &RecordData) -> TrackResult<Record> {
        self.inner.create(collection, data).await
    }

    async fn update(&self, collection: Collection, id: &str, data: &RecordData) -> TrackResult<Record> {
        self.inner.update(collection, id, data).await
    }

    async fn update_returning_previous(
        &self,
        collection: Collection,
        id: &str,
        data: &RecordData,
    ) -> TrackResult<(Record, Record)> {
        self.inner.update_returning_previous(collection, id, data).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> TrackResult<()> {
        self.inner.delete(collection, id).await
    }

    async fn delete_returning(&self, collection: Collection, id: &str) -> TrackResult<Record> {
        self.inner.delete_returning(collection, id).await
    }

    async fn health_check(&self) -> TrackResult<()> {
        self.inner.health_check().await
    }
}

/// A cache whose every call fails, as if Redis were unreachable.
#[derive(Default)]
pub struct BrokenCache;

#[async_trait]
impl CacheInterface for BrokenCache {
    async fn get_raw(&self, _key: &str) -> TrackResult<Option<String>> {
        Err(TrackError::Cache("connection refused".to_string()))
    }

    async fn set_raw(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> TrackResult<()> {
        Err(TrackError::Cache("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> TrackResult<bool> {
        Err(TrackError::Cache("connection refused".to_string()))
    }

    async fn health_check(&self) -> ComponentHealth {
        ComponentHealth::unhealthy("Redis connection failed", "connection refused")
    }
}
