//! Budget factors and health classification.
//!
//! The latency ramp runs from `healthy_p95_ms` (factor 1.0) down to
//! `degraded_p95_ms` (factor 0.0), while the health classifier only calls a
//! service DEGRADED once p95 exceeds `degraded_p95_ms`. A service with p95
//! inside the ramp therefore gets a reduced budget yet stays HEALTHY. The
//! two rules are evaluated independently and must stay that way.

use crate::analysis::latency::LatencyStats;
use crate::budget::HealthStatus;
use crate::config::{ErrorRateThresholds, LatencyThresholds};

/// Result of assessing one latency/error snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub latency_factor: f64,
    pub error_factor: f64,
    pub allocated_budget: u32,
    pub health_status: HealthStatus,
}

/// Pure calculator parameterised by configured thresholds.
#[derive(Debug, Clone)]
pub struct HealthCalculator {
    latency: LatencyThresholds,
    error_rate: ErrorRateThresholds,
}

impl HealthCalculator {
    pub fn new(latency: LatencyThresholds, error_rate: ErrorRateThresholds) -> Self {
        Self { latency, error_rate }
    }

    /// 1.0 at or below the healthy p95, 0.0 at or above the degraded p95,
    /// linear in between.
    pub fn latency_factor(&self, stats: &LatencyStats) -> f64 {
        let p95 = stats.p95;
        let healthy = self.latency.healthy_p95_ms as f64;
        let degraded = self.latency.degraded_p95_ms as f64;

        if p95 <= healthy {
            1.0
        } else if p95 >= degraded {
            0.0
        } else {
            (1.0 - (p95 - healthy) / (degraded - healthy)).max(0.0)
        }
    }

    /// 1.0 with no errors, 0.0 at or above the critical rate, linear in between.
    pub fn error_factor(&self, error_rate: f64) -> f64 {
        let critical = self.error_rate.critical_percent;

        if error_rate <= 0.0 {
            1.0
        } else if error_rate >= critical {
            0.0
        } else {
            (1.0 - error_rate / critical).max(0.0)
        }
    }

    /// `round(base * latency_factor * error_factor)`, never negative.
    pub fn retry_budget(&self, stats: &LatencyStats, error_rate: f64, base_budget: u32) -> u32 {
        allocate(
            base_budget,
            self.latency_factor(stats),
            self.error_factor(error_rate),
        )
    }

    /// Threshold classification, independent of the factor math.
    pub fn health_status(&self, stats: &LatencyStats, error_rate: f64) -> HealthStatus {
        if stats.p99 > self.latency.critical_p99_ms as f64
            || error_rate > self.error_rate.critical_percent
        {
            HealthStatus::Critical
        } else if stats.p95 > self.latency.degraded_p95_ms as f64 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    /// Factors, budget and health for a snapshot.
    ///
    /// Without any latency samples the service is assumed healthy: both
    /// factors are 1.0 and the full base budget is granted.
    pub fn assess(&self, stats: &LatencyStats, error_rate: f64, base_budget: u32) -> Assessment {
        if stats.is_empty() {
            return Assessment {
                latency_factor: 1.0,
                error_factor: 1.0,
                allocated_budget: base_budget,
                health_status: HealthStatus::Healthy,
            };
        }

        let latency_factor = self.latency_factor(stats);
        let error_factor = self.error_factor(error_rate);
        Assessment {
            latency_factor,
            error_factor,
            allocated_budget: allocate(base_budget, latency_factor, error_factor),
            health_status: self.health_status(stats, error_rate),
        }
    }
}

fn allocate(base_budget: u32, latency_factor: f64, error_factor: f64) -> u32 {
    let raw = (base_budget as f64 * latency_factor * error_factor).round();
    if raw.is_finite() && raw > 0.0 {
        raw as u32
    } else {
        0
    }
}
