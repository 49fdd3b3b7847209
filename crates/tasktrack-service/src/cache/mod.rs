//! Caching infrastructure for the service layer.
//!
//! A key/value store with optional per-entry TTL, used as a lookaside cache.
//! Redis backs production; the in-memory store serves development and tests.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::InMemoryCache;
pub use redis_cache::{RedisCacheService, RedisCacheServiceParameters};
