//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tasktrack_core::{TrackError, TrackResult};
use url::Url;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis connection configuration.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Cache policy configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Record store configuration.
    #[serde(default)]
    pub record_store: RecordStoreConfig,

    /// Permission rendering configuration.
    #[serde(default)]
    pub permissions: PermissionsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "tasktrack".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Prefix every API route is nested under.
    pub api_prefix: String,
    /// Enable CORS.
    pub cors_enabled: bool,
    /// CORS allowed origins.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            api_prefix: "/api".to_string(),
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Redis connection configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: u16,
    /// Optional password.
    pub password: Option<String>,
    /// Logical database index.
    pub db: i64,
    /// Connection pool size.
    pub pool_size: usize,
    /// Timeout for establishing or waiting for a connection, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            pool_size: 10,
            connect_timeout_ms: 10_000,
        }
    }
}

impl RedisConfig {
    /// Builds the connection URL, percent-encoding the password.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Configuration`] when host or password cannot form a URL.
    pub fn url(&self) -> TrackResult<String> {
        let mut url = Url::parse(&format!("redis://{}:{}/{}", self.host, self.port, self.db))
            .map_err(|e| TrackError::Configuration(format!("Invalid Redis address: {}", e)))?;

        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password))
                .map_err(|()| TrackError::Configuration("Invalid Redis password".to_string()))?;
        }

        Ok(url.to_string())
    }

    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("db", &self.db)
            .field("pool_size", &self.pool_size)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    /// Process-local cache for development and tests.
    Memory,
}

/// Cache policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Which cache store to use.
    pub backend: CacheBackend,
    /// Lifetime of list and by-id entries, in seconds.
    pub ttl_secs: u64,
    /// Also evict `<collection>:<id>` on update and delete.
    pub invalidate_by_id: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            ttl_secs: 300, // 5 minutes
            invalidate_by_id: false,
        }
    }
}

impl CacheConfig {
    /// Returns the entry TTL as a Duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Record store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStoreBackend {
    #[default]
    PocketBase,
    /// Process-local store for development and tests.
    Memory,
}

/// Record store configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStoreConfig {
    /// Which record store to use.
    pub backend: RecordStoreBackend,
    /// Base URL of the PocketBase server.
    pub url: String,
    /// Optional token sent as the `Authorization` header.
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Page size used while walking a full list.
    pub full_list_batch_size: u32,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            backend: RecordStoreBackend::PocketBase,
            url: "http://127.0.0.1:8090".to_string(),
            auth_token: None,
            timeout_secs: 30,
            full_list_batch_size: 500,
        }
    }
}

impl RecordStoreConfig {
    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for RecordStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStoreConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("full_list_batch_size", &self.full_list_batch_size)
            .finish()
    }
}

/// Permission rendering configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Offset applied to `created`/`updated` timestamps; the host's local offset when unset.
    pub utc_offset_minutes: Option<i32>,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
