//! Redis-based cache implementation.

use super::CacheInterface;
use crate::dto::ComponentHealth;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use shaku::Component;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tasktrack_core::{TrackError, TrackResult};
use tracing::{debug, error};

/// Redis-based cache service.
#[derive(Component, Default)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> TrackResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                TrackError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(TrackError::Cache("Redis pool is not configured".to_string())),
        }
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    async fn get_raw(&self, key: &str) -> TrackResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            TrackError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit: {}", key),
            None => debug!("Cache miss: {}", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TrackResult<()> {
        let mut conn = self.get_conn().await?;

        match ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        }
        .map_err(|e| TrackError::Cache(format!("Failed to set key '{}': {}", key, e)))?;

        debug!("Cache set: {} (ttl {:?})", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> TrackResult<bool> {
        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            TrackError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Cache deleted: {} (existed: {})", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn health_check(&self) -> ComponentHealth {
        let started = Instant::now();

        let probe = async {
            let mut conn = self.get_conn().await?;
            let pong: String = deadpool_redis::redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| TrackError::Cache(format!("PING failed: {}", e)))?;
            Ok::<_, TrackError>(pong)
        };

        match probe.await {
            Ok(_) => {
                let latency = started.elapsed();
                ComponentHealth::healthy(
                    format!("Redis is responding ({}ms)", latency.as_millis()),
                    Some(latency),
                )
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                ComponentHealth::unhealthy("Redis connection failed", e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("configured", &self.pool.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::HealthStatus;

    fn unconfigured() -> RedisCacheService {
        RedisCacheService::default()
    }

    #[tokio::test]
    async fn test_unconfigured_pool_reports_cache_errors() {
        let cache = unconfigured();
        assert!(matches!(cache.get_raw("k").await, Err(TrackError::Cache(_))));
        assert!(matches!(cache.delete("k").await, Err(TrackError::Cache(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_pool_is_unhealthy() {
        let health = unconfigured().health_check().await;
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert!(health.latency_ms.is_none());
    }
}
