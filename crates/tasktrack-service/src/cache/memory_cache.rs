//! Process-local cache with lazy expiry.
//!
//! Expired entries are dropped when read, and swept in bulk every
//! `SWEEP_EVERY` writes so keys that are never read again do not pile up.

use super::CacheInterface;
use crate::dto::ComponentHealth;
use async_trait::async_trait;
use parking_lot::Mutex;
use shaku::Component;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tasktrack_core::TrackResult;
use tokio::time::Instant;
use tracing::debug;

/// Writes between two sweeps of expired entries.
const SWEEP_EVERY: usize = 64;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory cache.
///
/// Expiry is measured on the tokio clock, so a paused runtime can advance
/// past a TTL without sleeping.
#[derive(Component, Default)]
#[shaku(interface = CacheInterface)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    writes: AtomicUsize,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    /// Returns true when no live entry is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheInterface for InMemoryCache {
    async fn get_raw(&self, key: &str) -> TrackResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let value = match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        };

        match &value {
            Some(_) => debug!("Cache hit: {}", key),
            None => debug!("Cache miss: {}", key),
        }
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TrackResult<()> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| now + ttl),
        };

        let mut entries = self.entries.lock();
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            let before = entries.len();
            entries.retain(|_, e| e.is_live(now));
            debug!("Cache sweep dropped {} expired entries", before - entries.len());
        }
        entries.insert(key.to_string(), entry);
        debug!("Cache set: {} (ttl {:?})", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> TrackResult<bool> {
        let now = Instant::now();
        let removed = self
            .entries
            .lock()
            .remove(key)
            .is_some_and(|entry| entry.is_live(now));
        debug!("Cache deleted: {} (existed: {})", key, removed);
        Ok(removed)
    }

    async fn health_check(&self) -> ComponentHealth {
        ComponentHealth::healthy("In-memory cache is available", Some(Duration::ZERO))
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}
