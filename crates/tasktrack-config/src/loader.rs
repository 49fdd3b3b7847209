//! Configuration loader with layered sources.

use crate::{AppConfig, CacheBackend, RecordStoreBackend};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use std::path::Path;
use tasktrack_core::TrackError;
use tracing::{debug, info, warn};
use url::Url;

/// Bare environment variables understood for compatibility with existing
/// deployments, mapped onto configuration keys.
const LEGACY_VARIABLES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("POCKETBASE_URL", "record_store.url"),
    ("REDIS_HOST", "redis.host"),
    ("REDIS_PORT", "redis.port"),
    ("REDIS_PASSWORD", "redis.password"),
    ("REDIS_DB", "redis.db"),
    ("REDIS_CONNECT_TIMEOUT", "redis.connect_timeout_ms"),
];

/// Values of the legacy variables, captured once so loading stays testable.
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    values: Vec<(&'static str, String)>,
}

impl LegacyEnv {
    /// Reads the legacy variables from the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        let values = LEGACY_VARIABLES
            .iter()
            .filter_map(|(var, key)| std::env::var(var).ok().map(|value| (*key, value)))
            .collect();
        Self { values }
    }

    /// Builds from explicit `(variable, value)` pairs; unknown variables are ignored.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let values = pairs
            .iter()
            .filter_map(|(var, value)| {
                LEGACY_VARIABLES
                    .iter()
                    .find(|(known, _)| known == var)
                    .map(|(_, key)| (*key, (*value).to_string()))
            })
            .collect();
        Self { values }
    }

    fn apply(
        &self,
        mut builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        for (key, value) in &self.values {
            debug!("Applying legacy override for {}", key);
            builder = builder.set_override(*key, value.clone())?;
        }
        Ok(builder)
    }
}

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Uncommitted local overrides
    /// 4. Environment variables with `TASKTRACK__` prefix
    /// 5. Legacy variables (`PORT`, `POCKETBASE_URL`, `REDIS_*`)
    pub fn new(config_dir: &str) -> Result<Self, TrackError> {
        Ok(Self {
            config: Self::load_config(config_dir)?,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, TrackError> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, TrackError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("TASKTRACK_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        Self::build(config_dir, &environment, &LegacyEnv::from_process())
    }

    /// Assembles and validates the configuration from all layers.
    pub fn build(
        config_dir: &str,
        environment: &str,
        legacy: &LegacyEnv,
    ) -> Result<AppConfig, TrackError> {
        let mut builder = Config::builder();

        for name in ["default", environment, "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TASKTRACK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder = legacy.apply(builder).map_err(config_error_to_track_error)?;

        let mut app_config: AppConfig = builder
            .build()
            .map_err(config_error_to_track_error)?
            .try_deserialize()
            .map_err(config_error_to_track_error)?;

        if app_config.app.environment != environment {
            app_config.app.environment = environment.to_string();
        }

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> Result<(), TrackError> {
        if config.cache.ttl_secs == 0 {
            return Err(TrackError::Configuration(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }

        if config.record_store.backend == RecordStoreBackend::PocketBase {
            if config.record_store.url.trim().is_empty() {
                return Err(TrackError::Configuration(
                    "Record store URL is required".to_string(),
                ));
            }
            Url::parse(&config.record_store.url).map_err(|e| {
                TrackError::Configuration(format!("Invalid record store URL: {}", e))
            })?;
        }

        if config.record_store.full_list_batch_size == 0 {
            return Err(TrackError::Configuration(
                "record_store.full_list_batch_size must be greater than zero".to_string(),
            ));
        }

        if config.cache.backend == CacheBackend::Redis {
            config.redis.url()?;
        }

        if config.app.environment == "production" && config.cache.backend == CacheBackend::Memory {
            warn!("Using the in-process cache in production; entries are not shared between instances");
        }

        Ok(())
    }
}

fn config_error_to_track_error(err: ConfigError) -> TrackError {
    TrackError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ConfigLoader::build(dir.path().to_str().unwrap(), "test", &LegacyEnv::default())
                .unwrap();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.app.environment, "test");
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "default.toml", "[server]\nport = 4000\n[cache]\nttl_secs = 120\n");
        write(dir.path(), "staging.toml", "[server]\nport = 5000\n");

        let config =
            ConfigLoader::build(dir.path().to_str().unwrap(), "staging", &LegacyEnv::default())
                .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.cache.ttl_secs, 120);
    }

    #[test]
    fn test_legacy_variables_override_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "default.toml", "[server]\nport = 4000\n");

        let legacy = LegacyEnv::from_pairs(&[
            ("PORT", "3005"),
            ("POCKETBASE_URL", "http://pb.internal:8090"),
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_DB", "3"),
            ("UNRELATED", "ignored"),
        ]);
        let config = ConfigLoader::build(dir.path().to_str().unwrap(), "test", &legacy).unwrap();

        assert_eq!(config.server.port, 3005);
        assert_eq!(config.record_store.url, "http://pb.internal:8090");
        assert_eq!(config.redis.host, "cache.internal");
        assert_eq!(config.redis.db, 3);
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "default.toml", "[cache]\nttl_secs = 0\n");

        let err = ConfigLoader::build(dir.path().to_str().unwrap(), "test", &LegacyEnv::default())
            .unwrap_err();
        assert!(matches!(err, TrackError::Configuration(_)));
    }

    #[test]
    fn test_invalid_record_store_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "default.toml", "[record_store]\nurl = \"not a url\"\n");

        assert!(
            ConfigLoader::build(dir.path().to_str().unwrap(), "test", &LegacyEnv::default())
                .is_err()
        );
    }

    #[test]
    fn test_memory_backends_skip_url_checks() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "default.toml",
            "[cache]\nbackend = \"memory\"\n[record_store]\nbackend = \"memory\"\nurl = \"\"\n",
        );

        let config =
            ConfigLoader::build(dir.path().to_str().unwrap(), "test", &LegacyEnv::default())
                .unwrap();
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.record_store.backend, RecordStoreBackend::Memory);
    }
}
