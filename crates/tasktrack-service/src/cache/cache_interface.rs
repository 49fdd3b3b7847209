//! Cache interface trait for abstracted caching operations.

use crate::dto::ComponentHealth;
use async_trait::async_trait;
use serde_json::Value;
use shaku::Interface;
use std::time::Duration;
use tasktrack_core::TrackResult;

/// Key/value cache with optional per-entry expiry.
///
/// Values are stored as strings. Errors are reserved for transport failures;
/// an absent or expired key is `Ok(None)`.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Gets the stored string for a key.
    async fn get_raw(&self, key: &str) -> TrackResult<Option<String>>;

    /// Stores a string. Without a TTL the entry persists until deleted.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TrackResult<()>;

    /// Deletes a key. Idempotent; returns whether a key was removed.
    async fn delete(&self, key: &str) -> TrackResult<bool>;

    /// Round-trip probe with latency.
    async fn health_check(&self) -> ComponentHealth;
}

/// Typed access on top of [`CacheInterface`].
///
/// Wire format: strings are stored verbatim, everything else as JSON. Reads
/// try to parse JSON and fall back to the raw string.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Gets a value as JSON.
    async fn get_value(&self, key: &str) -> TrackResult<Option<Value>> {
        Ok(self.get_raw(key).await?.map(|raw| {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }))
    }

    /// Gets a typed value.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> TrackResult<Option<T>> {
        match self.get_value(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Sets a typed value.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> TrackResult<()> {
        let raw = match serde_json::to_value(value)? {
            Value::String(text) => text,
            other => other.to_string(),
        };
        self.set_raw(key, &raw, ttl).await
    }
}

// Blanket implementation for all CacheInterface implementations
impl<T: CacheInterface + ?Sized> CacheExt for T {}
