//! Health service trait definition.

use crate::dto::{ComponentHealth, HealthReport};
use async_trait::async_trait;
use tasktrack_core::Interface;

/// Dependency probes.
#[async_trait]
pub trait HealthService: Interface + Send + Sync {
    /// Probes the record store and the cache.
    async fn check(&self) -> HealthReport;

    /// Probes the cache only.
    async fn cache_health(&self) -> ComponentHealth;
}
