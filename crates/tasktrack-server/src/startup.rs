//! Server startup utilities.

use tasktrack_config::AppConfig;
use tasktrack_service::ComponentHealth;
use tracing::{info, warn};

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
  _____         _    _____               _
 |_   _|_ _ ___| | _|_   _| __ __ _  ___| | __
   | |/ _` / __| |/ / | || '__/ _` |/ __| |/ /
   | | (_| \__ \   <  | || | | (_| | (__|   <
   |_|\__,_|___/_|\_\ |_||_|  \__,_|\___|_|\_\
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let port = config.server.port;
    let prefix = config.server.api_prefix.trim_end_matches('/');

    info!("{}", separator);
    info!("REST API:  http://{}:{}{}", config.server.host, port, prefix);
    info!("Health:    http://{}:{}{}/health", config.server.host, port, prefix);
    info!("Cache TTL: {}s", config.cache.ttl_secs);
    info!("{}", separator);
}

/// Logs the one-off cache probe made at startup.
///
/// An unreachable cache does not stop the server; reads fall back to the
/// record store until it recovers.
pub fn report_cache_health(health: &ComponentHealth) -> bool {
    if health.is_healthy() {
        info!(
            "Cache is ready for caching ({})",
            health
                .latency_ms
                .map_or_else(|| "latency unknown".to_string(), |ms| format!("{ms}ms"))
        );
        true
    } else {
        warn!(
            "Cache is not available, requests will be served from the record store: {}",
            health.error.as_deref().unwrap_or(&health.message)
        );
        false
    }
}
