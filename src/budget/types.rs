//! Budget records and decision types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a service's operating condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Degraded => "DEGRADED",
            HealthStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable description of a health status.
pub fn health_description(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "Service is operating normally",
        HealthStatus::Degraded => "Service is experiencing issues",
        HealthStatus::Critical => "Service is severely impaired",
    }
}

/// Outcome of a retry admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryDecision {
    Allow,
    Deny,
    Defer,
}

impl RetryDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryDecision::Allow => "ALLOW",
            RetryDecision::Deny => "DENY",
            RetryDecision::Defer => "DEFER",
        }
    }
}

impl fmt::Display for RetryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable description of a retry decision.
pub fn decision_description(decision: RetryDecision) -> &'static str {
    match decision {
        RetryDecision::Allow => "Retry is allowed",
        RetryDecision::Deny => "Retry is denied - budget exceeded",
        RetryDecision::Defer => "Retry is deferred - service degraded",
    }
}

/// Retry allowance for one service, persisted with an expiry.
///
/// Invariant: `remaining_budget == allocated_budget - used_budget`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryBudget {
    pub service_name: String,
    pub allocated_budget: u32,
    pub used_budget: u32,
    pub remaining_budget: u32,
    pub health_status: HealthStatus,
    /// In `[0.0, 1.0]`.
    pub latency_factor: f64,
    /// In `[0.0, 1.0]`.
    pub error_factor: f64,
    pub last_calculated_ms: u64,
    pub expires_at_ms: u64,
}

impl RetryBudget {
    /// A budget is served from cache only while `now < expires_at`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Spend one retry. No-op once nothing remains.
    pub fn consume(&mut self) -> bool {
        if self.remaining_budget == 0 {
            return false;
        }
        self.used_budget += 1;
        self.remaining_budget -= 1;
        true
    }
}
