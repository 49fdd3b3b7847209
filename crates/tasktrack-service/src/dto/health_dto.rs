//! Health-related DTOs.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Health of a single dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of probing one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl ComponentHealth {
    /// A successful probe.
    pub fn healthy(message: impl Into<String>, latency: Option<Duration>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: message.into(),
            latency_ms: latency.map(|l| u64::try_from(l.as_millis()).unwrap_or(u64::MAX)),
            error: None,
            timestamp: now_iso(),
        }
    }

    /// A failed probe.
    pub fn unhealthy(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: message.into(),
            latency_ms: None,
            error: Some(error.into()),
            timestamp: now_iso(),
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Combined record store and cache health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub timestamp: String,
    pub database: ComponentHealth,
    pub cache: ComponentHealth,
    pub overall: HealthStatus,
}

impl HealthReport {
    /// Combines the two probes; healthy only when both are.
    #[must_use]
    pub fn new(database: ComponentHealth, cache: ComponentHealth) -> Self {
        let overall = if database.is_healthy() && cache.is_healthy() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self {
            timestamp: now_iso(),
            database,
            cache,
            overall,
        }
    }
}

/// Liveness payload for the root route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub timestamp: String,
    pub message: String,
    pub version: String,
}

impl ServiceStatus {
    /// The server is up.
    #[must_use]
    pub fn running(version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: now_iso(),
            message: "Server is running".to_string(),
            version: version.into(),
        }
    }
}
