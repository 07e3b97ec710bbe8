//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the budget
//! service. All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the retry budget service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Retries granted to a perfectly healthy service per interval.
    pub base_budget: u32,

    /// Length of the informational metrics window in seconds.
    pub evaluation_window_secs: u64,

    /// Budget validity and scheduled refresh period in seconds.
    pub update_interval_secs: u64,

    /// Latency thresholds.
    pub latency_thresholds: LatencyThresholds,

    /// Error-rate thresholds.
    pub error_rate_thresholds: ErrorRateThresholds,

    /// Backing store settings.
    pub store: StoreConfig,

    /// Retrying caller settings.
    pub client: ClientConfig,

    /// Inspection API settings.
    pub api: ApiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            base_budget: 5,
            evaluation_window_secs: 60,
            update_interval_secs: 10,
            latency_thresholds: LatencyThresholds::default(),
            error_rate_thresholds: ErrorRateThresholds::default(),
            store: StoreConfig::default(),
            client: ClientConfig::default(),
            api: ApiConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl BudgetConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn evaluation_window(&self) -> Duration {
        Duration::from_secs(self.evaluation_window_secs)
    }
}

/// Latency thresholds in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyThresholds {
    /// p95 at or below this keeps the full latency factor.
    pub healthy_p95_ms: u64,

    /// p95 above this is DEGRADED; also the zero point of the latency ramp.
    pub degraded_p95_ms: u64,

    /// p99 above this is CRITICAL.
    pub critical_p99_ms: u64,
}

impl Default for LatencyThresholds {
    fn default() -> Self {
        Self {
            healthy_p95_ms: 200,
            degraded_p95_ms: 300,
            critical_p99_ms: 800,
        }
    }
}

/// Error-rate thresholds as percentages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorRateThresholds {
    /// Informational only.
    pub warning_percent: f64,

    /// Error rate at which the error factor reaches zero.
    pub critical_percent: f64,
}

impl Default for ErrorRateThresholds {
    fn default() -> Self {
        Self {
            warning_percent: 5.0,
            critical_percent: 10.0,
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store-level TTL for metrics and budget records in seconds.
    pub ttl_secs: u64,

    /// How often expired entries are swept from the in-memory store.
    pub purge_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            purge_interval_secs: 60,
        }
    }
}

impl StoreConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

/// Retrying caller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before retry `n` is `retry_delay_ms * n`.
    pub retry_delay_ms: u64,

    /// Extra wait on a deferred retry, scaled by `attempt + 1`.
    pub defer_delay_ms: u64,

    /// Request log entries kept per service.
    pub request_log_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 50,
            defer_delay_ms: 100,
            request_log_capacity: 100,
        }
    }
}

/// Inspection API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
