//! Health service implementation.

use crate::cache::CacheInterface;
use crate::dto::{ComponentHealth, HealthReport};
use crate::health_service::HealthService;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tasktrack_store::RecordStore;
use tracing::warn;

/// Probes the record store and the cache.
pub struct HealthServiceImpl {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheInterface>,
}

impl HealthServiceImpl {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn CacheInterface>) -> Self {
        Self { store, cache }
    }

    async fn database_health(&self) -> ComponentHealth {
        let start = Instant::now();
        match self.store.health_check().await {
            Ok(()) => ComponentHealth::healthy("Database connection is working", Some(start.elapsed())),
            Err(e) => {
                warn!("Record store health check failed: {}", e);
                ComponentHealth::unhealthy("Database connection failed", e.to_string())
            }
        }
    }
}

#[async_trait]
impl HealthService for HealthServiceImpl {
    async fn check(&self) -> HealthReport {
        let (database, cache) = tokio::join!(self.database_health(), self.cache.health_check());
        HealthReport::new(database, cache)
    }

    async fn cache_health(&self) -> ComponentHealth {
        self.cache.health_check().await
    }
}

impl std::fmt::Debug for HealthServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryCache, RedisCacheService};
    use crate::dto::HealthStatus;
    use tasktrack_store::InMemoryRecordStore;

    #[tokio::test]
    async fn test_memory_backends_are_healthy() {
        let service = HealthServiceImpl::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryCache::new()),
        );
        let report = service.check().await;

        assert_eq!(report.overall, HealthStatus::Healthy);
        assert_eq!(report.database.message, "Database connection is working");
        assert!(report.database.latency_ms.is_some());
    }

    #[tokio::test]
    async fn test_unconfigured_redis_makes_overall_unhealthy() {
        let service = HealthServiceImpl::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(RedisCacheService::default()),
        );
        let report = service.check().await;

        assert_eq!(report.overall, HealthStatus::Unhealthy);
        assert!(report.database.is_healthy());
        assert_eq!(report.cache.message, "Redis connection failed");
        assert!(!service.cache_health().await.is_healthy());
    }
}
