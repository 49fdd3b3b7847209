//! Cache invalidation after writes.

use crate::cache::{cache_keys, CacheInterface};
use std::sync::Arc;
use tasktrack_core::{Collection, Scope};
use tracing::{info, warn};

/// The kind of write that triggered an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
}

/// Outcome of a best-effort invalidation.
///
/// Never turned into an error: the write it follows has already succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Keys the cache acknowledged deleting (present or not).
    pub evicted: Vec<String>,
    /// Keys whose deletion failed, with the failure message.
    pub failed: Vec<(String, String)>,
}

impl InvalidationReport {
    /// True when every key was evicted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Writes the report to the log.
    pub fn log(&self, collection: Collection) {
        for key in &self.evicted {
            info!("Invalidated cache key: {}", key);
        }
        for (key, error) in &self.failed {
            warn!(
                "Failed to invalidate {} cache key {}; it stays stale until expiry: {}",
                collection, key, error
            );
        }
    }
}

/// Computes and evicts the cache keys a write may have made stale.
pub struct InvalidationCoordinator {
    cache: Arc<dyn CacheInterface>,
    invalidate_by_id: bool,
}

impl InvalidationCoordinator {
    /// Creates a coordinator.
    ///
    /// With `invalidate_by_id` off, updates and deletes leave
    /// `<namespace>:<id>` in place until it expires.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheInterface>, invalidate_by_id: bool) -> Self {
        Self {
            cache,
            invalidate_by_id,
        }
    }

    /// Keys to evict for a write touching `emails`.
    ///
    /// Always includes `<namespace>_list:all`; one list key per distinct
    /// email; and `<namespace>:<id>` for updates and deletes when enabled.
    #[must_use]
    pub fn keys_for<'a>(
        &self,
        collection: Collection,
        kind: WriteKind,
        id: &str,
        emails: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();

        for email in emails {
            let key = cache_keys::list_key(collection, &Scope::from_email(Some(email)));
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let all = cache_keys::list_key(collection, &Scope::All);
        if !keys.contains(&all) {
            keys.push(all);
        }

        if self.invalidate_by_id && kind != WriteKind::Create {
            keys.push(cache_keys::record_key(collection, id));
        }

        keys
    }

    /// Evicts every key for the write. Failures are collected, not returned.
    pub async fn on_write<'a>(
        &self,
        collection: Collection,
        kind: WriteKind,
        id: &str,
        emails: impl IntoIterator<Item = &'a str>,
    ) -> InvalidationReport {
        let mut report = InvalidationReport::default();

        for key in self.keys_for(collection, kind, id, emails) {
            match self.cache.delete(&key).await {
                Ok(_) => report.evicted.push(key),
                Err(e) => report.failed.push((key, e.to_string())),
            }
        }

        report
    }
}

impl std::fmt::Debug for InvalidationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationCoordinator")
            .field("invalidate_by_id", &self.invalidate_by_id)
            .finish_non_exhaustive()
    }
}
