//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, thresholds ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BudgetConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::BudgetConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("update_interval_secs must be greater than 0")]
    ZeroUpdateInterval,

    #[error("healthy_p95_ms ({healthy}) must be below degraded_p95_ms ({degraded})")]
    LatencyRampInverted { healthy: u64, degraded: u64 },

    #[error("critical_percent must be positive, got {0}")]
    NonPositiveCriticalErrorRate(f64),

    #[error("warning_percent ({warning}) must not exceed critical_percent ({critical})")]
    WarningAboveCritical { warning: f64, critical: f64 },

    #[error("store ttl_secs must be greater than 0")]
    ZeroStoreTtl,

    #[error("store purge_interval_secs must be greater than 0")]
    ZeroPurgeInterval,

    #[error("request_log_capacity must be greater than 0")]
    ZeroRequestLogCapacity,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BudgetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.update_interval_secs == 0 {
        errors.push(ValidationError::ZeroUpdateInterval);
    }

    let latency = &config.latency_thresholds;
    if latency.healthy_p95_ms >= latency.degraded_p95_ms {
        errors.push(ValidationError::LatencyRampInverted {
            healthy: latency.healthy_p95_ms,
            degraded: latency.degraded_p95_ms,
        });
    }

    let rates = &config.error_rate_thresholds;
    if rates.critical_percent <= 0.0 || rates.critical_percent.is_nan() {
        errors.push(ValidationError::NonPositiveCriticalErrorRate(rates.critical_percent));
    } else if rates.warning_percent > rates.critical_percent {
        errors.push(ValidationError::WarningAboveCritical {
            warning: rates.warning_percent,
            critical: rates.critical_percent,
        });
    }

    if config.store.ttl_secs == 0 {
        errors.push(ValidationError::ZeroStoreTtl);
    }

    if config.store.purge_interval_secs == 0 {
        errors.push(ValidationError::ZeroPurgeInterval);
    }

    if config.client.request_log_capacity == 0 {
        errors.push(ValidationError::ZeroRequestLogCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
