//! Dependency injection module using Shaku.
//!
//! The two leaf clients, the record store and the cache, are Shaku
//! components. Configured memory backends replace them through component
//! overrides. Services are built on top of the resolved clients.

use deadpool_redis::{PoolConfig, Runtime, Timeouts};
use shaku::{module, HasComponent};
use std::sync::Arc;
use std::time::Duration;
use tasktrack_config::{AppConfig, CacheBackend, RecordStoreBackend, RedisConfig};
use tasktrack_core::{TrackError, TrackResult};
use tasktrack_rest::AppState;
use tasktrack_service::{
    resolve_offset, CacheInterface, HealthServiceImpl, InMemoryCache, InvalidationCoordinator,
    PermissionServiceImpl, QueryService, RedisCacheService, RedisCacheServiceParameters,
    TaskServiceImpl,
};
use tasktrack_store::{InMemoryRecordStore, PocketBaseRecordStore, RecordStore};
use tracing::info;

module! {
    pub TaskTrackModule {
        components = [
            PocketBaseRecordStore,
            RedisCacheService,
        ],
        providers = [],
    }
}

/// Builds the client module for the configured backends.
///
/// # Errors
///
/// Fails when the record store URL or the Redis settings are unusable.
pub fn build_module(config: &AppConfig) -> TrackResult<Arc<TaskTrackModule>> {
    let mut builder = TaskTrackModule::builder();

    builder = match config.record_store.backend {
        RecordStoreBackend::PocketBase => {
            info!("Record store: PocketBase at {}", config.record_store.url);
            builder.with_component_override::<dyn RecordStore>(Box::new(
                PocketBaseRecordStore::new(&config.record_store)?,
            ))
        }
        RecordStoreBackend::Memory => {
            info!("Record store: in-memory");
            builder.with_component_override::<dyn RecordStore>(Box::new(InMemoryRecordStore::new()))
        }
    };

    builder = match config.cache.backend {
        CacheBackend::Redis => {
            info!(
                "Cache: Redis at {}:{} (db {})",
                config.redis.host, config.redis.port, config.redis.db
            );
            builder.with_component_parameters::<RedisCacheService>(RedisCacheServiceParameters {
                pool: Some(Arc::new(create_redis_pool(&config.redis)?)),
            })
        }
        CacheBackend::Memory => {
            info!("Cache: in-memory");
            builder.with_component_override::<dyn CacheInterface>(Box::new(InMemoryCache::new()))
        }
    };

    Ok(Arc::new(builder.build()))
}

/// Creates the Redis pool. Connections are opened lazily.
///
/// # Errors
///
/// Returns [`TrackError::Cache`] when the pool cannot be created.
pub fn create_redis_pool(redis: &RedisConfig) -> TrackResult<deadpool_redis::Pool> {
    let timeout = Some(Duration::from_millis(redis.connect_timeout_ms));

    let mut cfg = deadpool_redis::Config::from_url(redis.url()?);
    let mut pool = PoolConfig::new(redis.pool_size.max(1));
    pool.timeouts = Timeouts {
        wait: timeout,
        create: timeout,
        recycle: timeout,
    };
    cfg.pool = Some(pool);

    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| TrackError::Cache(format!("Failed to create Redis pool: {}", e)))
}

/// Builds the services and the REST state from the resolved clients.
///
/// # Errors
///
/// Fails when the permission time offset is out of range.
pub fn build_state(module: &TaskTrackModule, config: &AppConfig) -> TrackResult<AppState> {
    let store = module.record_store();
    let cache = module.cache();

    let queries = Arc::new(QueryService::new(store.clone(), cache.clone(), config.cache.ttl()));
    let invalidation = Arc::new(InvalidationCoordinator::new(
        cache.clone(),
        config.cache.invalidate_by_id,
    ));
    let offset = resolve_offset(&config.permissions)?;

    Ok(AppState::new(
        Arc::new(TaskServiceImpl::new(queries.clone(), invalidation)),
        Arc::new(PermissionServiceImpl::new(queries, offset)),
        Arc::new(HealthServiceImpl::new(store, cache)),
        config.app.version.clone(),
    ))
}

/// Resolves the shared clients from a module.
pub trait ClientResolver {
    fn record_store(&self) -> Arc<dyn RecordStore>;

    fn cache(&self) -> Arc<dyn CacheInterface>;
}

impl ClientResolver for TaskTrackModule {
    fn record_store(&self) -> Arc<dyn RecordStore> {
        self.resolve()
    }

    fn cache(&self) -> Arc<dyn CacheInterface> {
        self.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktrack_service::{HealthService, TaskPayload, TaskService};

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Memory;
        config.record_store.backend = RecordStoreBackend::Memory;
        config.permissions.utc_offset_minutes = Some(0);
        config
    }

    #[test]
    fn test_module_provides_clients() {
        fn _assert_has_store<T: HasComponent<dyn RecordStore>>() {}
        fn _assert_has_cache<T: HasComponent<dyn CacheInterface>>() {}

        _assert_has_store::<TaskTrackModule>();
        _assert_has_cache::<TaskTrackModule>();
    }

    #[tokio::test]
    async fn test_memory_backends_are_wired() {
        let config = memory_config();
        let module = build_module(&config).unwrap();
        let state = build_state(&module, &config).unwrap();

        let created = state
            .task_service
            .create_task(TaskPayload {
                email: Some("a@x.com".to_string()),
                ..TaskPayload::default()
            })
            .await
            .unwrap();
        assert_eq!(created.status_code, 201);

        // Services share the module's cache instance.
        module.cache().set_raw("probe", "1", None).await.unwrap();
        assert!(module.cache().get_raw("probe").await.unwrap().is_some());
        assert!(state.health_service.check().await.cache.is_healthy());
    }

    #[test]
    fn test_redis_pool_uses_configured_size() {
        let redis = RedisConfig {
            pool_size: 4,
            ..RedisConfig::default()
        };
        let pool = create_redis_pool(&redis).unwrap();
        assert_eq!(pool.status().max_size, 4);
    }

    #[test]
    fn test_invalid_offset_fails_state() {
        let mut config = memory_config();
        config.permissions.utc_offset_minutes = Some(10_000);
        let module = build_module(&config).unwrap();
        assert!(build_state(&module, &config).is_err());
    }
}
