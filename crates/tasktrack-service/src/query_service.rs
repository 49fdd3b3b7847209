//! Cache-aside reads over the record store.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::dto::{Envelope, Pagination, Source};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tasktrack_core::{Collection, Filter, ListQuery, Record, Scope, TrackError, TrackResult};
use tasktrack_store::RecordStore;
use tracing::{debug, error, warn};

/// Wraps record-store reads with cache lookup, miss-fetch-populate, and bypass.
///
/// Cache failures never fail a read: a failed lookup is treated as a miss and
/// a failed write-back is logged.
pub struct QueryService {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheInterface>,
    ttl: Duration,
}

impl QueryService {
    /// Creates a query service caching entries for `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn CacheInterface>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// Returns the record store this service reads from.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// One page of a collection, scoped to an email or to all records.
    ///
    /// Cached under `<namespace>_list:<scope>`.
    pub async fn get_page(
        &self,
        collection: Collection,
        scope: &Scope,
        query: ListQuery,
        bypass: bool,
    ) -> TrackResult<Envelope<Vec<Record>>> {
        let key = cache_keys::list_key(collection, scope);
        let query = query.scoped(scope);

        self.cached(key.clone(), bypass, |source| async move {
            let page = self
                .store
                .list(collection, &query)
                .await
                .map_err(|e| list_failure(collection, e))?;
            let pagination = Pagination::from(&page);

            Ok(Envelope::listing(collection, page.items, source, key).with_pagination(pagination))
        })
        .await
    }

    /// Every matching record of a collection, unpaginated.
    ///
    /// Shares its cache key with [`QueryService::get_page`].
    pub async fn get_full(
        &self,
        collection: Collection,
        scope: &Scope,
        query: ListQuery,
        bypass: bool,
    ) -> TrackResult<Envelope<Vec<Record>>> {
        let key = cache_keys::list_key(collection, scope);
        let query = query.scoped(scope);

        self.cached(key.clone(), bypass, |source| async move {
            let records = self
                .store
                .full_list(collection, &query)
                .await
                .map_err(|e| list_failure(collection, e))?;

            Ok(Envelope::listing(collection, records, source, key))
        })
        .await
    }

    /// A single record by id, cached under `<namespace>:<id>`.
    ///
    /// Any store failure surfaces as `NotFound`.
    pub async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
        bypass: bool,
    ) -> TrackResult<Envelope<Record>> {
        let key = cache_keys::record_key(collection, id);

        self.cached(key.clone(), bypass, |source| async move {
            let record = self.store.get_one(collection, id).await.map_err(|e| {
                if !e.is_not_found() {
                    error!("Error getting {} by ID {}: {}", collection, id, e);
                }
                TrackError::not_found(collection.cache_namespace(), id)
            })?;

            let message = format!("{} retrieved successfully", collection.cache_namespace());
            Ok(Envelope::ok(message, record, source, key))
        })
        .await
    }

    /// First record matching a filter. Never cached.
    pub async fn get_first(
        &self,
        collection: Collection,
        filter: &Filter,
        expand: Option<&str>,
    ) -> TrackResult<Record> {
        debug!("First {} matching {}", collection, filter);
        self.store.first(collection, filter, expand).await
    }

    /// Generic cache-aside around `fetch`.
    ///
    /// With `bypass`, the key is evicted, `fetch` runs with
    /// [`Source::DatabaseBypassed`], and nothing is written back. Otherwise a
    /// hit is returned with `source = cache`; a miss runs `fetch` with
    /// [`Source::Database`] and stores the result for the configured TTL.
    /// Failed fetches are never cached.
    pub async fn cached<T, F, Fut>(&self, key: String, bypass: bool, fetch: F) -> TrackResult<Envelope<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce(Source) -> Fut + Send,
        Fut: Future<Output = TrackResult<Envelope<T>>> + Send,
    {
        if bypass {
            debug!("Cache bypassed for {}, evicting and reading from the store", key);
            if let Err(e) = self.cache.delete(&key).await {
                warn!("Failed to evict bypassed key {}: {}", key, e);
            }
            return fetch(Source::DatabaseBypassed).await;
        }

        match self.cache.get::<Envelope<T>>(&key).await {
            Ok(Some(envelope)) => {
                debug!("Serving {} from cache", key);
                return Ok(envelope.served_from_cache(key));
            }
            Ok(None) => debug!("Cache miss for {}, reading from the store", key),
            Err(e) => warn!("Cache lookup for {} failed, reading from the store: {}", key, e),
        }

        let envelope = fetch(Source::Database).await?;

        match self.cache.set(&key, &envelope, Some(self.ttl)).await {
            Ok(()) => debug!("Cached {} for {:?}", key, self.ttl),
            Err(e) => warn!("Failed to cache {}: {}", key, e),
        }

        Ok(envelope)
    }
}

/// List reads hide store details behind a retryable "please try again" error.
pub(crate) fn list_failure(collection: Collection, err: TrackError) -> TrackError {
    match err {
        TrackError::Validation(_) => err,
        other => {
            error!("Error listing {}: {}", collection, other);
            TrackError::retrieval_failed(collection.cache_namespace())
        }
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use serde_json::json;
    use tasktrack_store::InMemoryRecordStore;

    fn service() -> (QueryService, Arc<InMemoryRecordStore>, Arc<InMemoryCache>) {
        let store = Arc::new(InMemoryRecordStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = QueryService::new(store.clone(), cache.clone(), Duration::from_secs(300));
        (service, store, cache)
    }

    fn seed(store: &InMemoryRecordStore, id: &str, email: &str) {
        let mut fields = tasktrack_core::RecordData::new();
        fields.insert("email".to_string(), json!(email));
        store.insert(Collection::TASK, Record::new(id, fields));
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (service, store, _) = service();
        seed(&store, "1", "a@x.com");
        let scope = Scope::Email("a@x.com".to_string());

        let first = service
            .get_page(Collection::TASK, &scope, ListQuery::new(), false)
            .await
            .unwrap();
        assert_eq!(first.source, Source::Database);
        assert_eq!(first.cache_key, "task_list:a@x.com");

        let second = service
            .get_page(Collection::TASK, &scope, ListQuery::new(), false)
            .await
            .unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.data, first.data);
        assert_eq!(second.pagination, first.pagination);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_bypass_evicts_and_does_not_repopulate() {
        let (service, store, cache) = service();
        seed(&store, "1", "a@x.com");

        service
            .get_page(Collection::TASK, &Scope::All, ListQuery::new(), false)
            .await
            .unwrap();
        assert!(cache.get_raw("task_list:all").await.unwrap().is_some());

        let bypassed = service
            .get_page(Collection::TASK, &Scope::All, ListQuery::new(), true)
            .await
            .unwrap();
        assert_eq!(bypassed.source, Source::DatabaseBypassed);
        assert!(cache.get_raw("task_list:all").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_result_is_cached_with_not_found_message() {
        let (service, _, cache) = service();
        let envelope = service
            .get_page(Collection::TASK, &Scope::All, ListQuery::new(), false)
            .await
            .unwrap();

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.message, "No task found");
        assert!(cache.get_raw("task_list:all").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_not_found_and_not_cached() {
        let (service, _, cache) = service();
        let err = service
            .get_by_id(Collection::TASK, "missing", false)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_full_list_shares_the_page_key() {
        let (service, store, _) = service();
        seed(&store, "1", "a@x.com");

        let page = service
            .get_page(Collection::TASK, &Scope::All, ListQuery::new(), false)
            .await
            .unwrap();
        let full = service
            .get_full(Collection::TASK, &Scope::All, ListQuery::new(), false)
            .await
            .unwrap();

        assert_eq!(full.cache_key, page.cache_key);
        assert_eq!(full.source, Source::Cache);
        // The cached page, pagination included, is what comes back.
        assert!(full.pagination.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let (service, store, cache) = service();
        seed(&store, "1", "a@x.com");
        cache.set_raw("task:1", "not an envelope", None).await.unwrap();

        let envelope = service.get_by_id(Collection::TASK, "1", false).await.unwrap();
        assert_eq!(envelope.source, Source::Database);
        assert_eq!(envelope.data.id, "1");
    }
}
