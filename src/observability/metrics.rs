//! Metrics collection and exposition.
//!
//! # Metrics
//! - `retry_budget_requests_total` (counter): request outcomes by service, outcome
//! - `retry_budget_retries_total` (counter): retries recorded by service
//! - `retry_budget_decisions_total` (counter): admission decisions by service, decision, reason
//! - `retry_budget_consumed_total` (counter): budget units spent by service
//! - `retry_budget_remaining` (gauge): remaining budget after the last consumption
//! - `retry_budget_average_latency_ms` (gauge): mean of the retained samples
//! - `retry_budget_refresh_total` (counter): scheduled refresh results by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::budget::RetryDecision;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request_outcome(service: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("retry_budget_requests_total", "service" => service.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_retry(service: &str) {
    counter!("retry_budget_retries_total", "service" => service.to_string()).increment(1);
}

/// `reason` distinguishes the two deny causes (`critical`, `exceeded`).
pub fn record_decision(service: &str, decision: RetryDecision, reason: &'static str) {
    let decision = match decision {
        RetryDecision::Allow => "allow",
        RetryDecision::Deny => "deny",
        RetryDecision::Defer => "defer",
    };
    counter!(
        "retry_budget_decisions_total",
        "service" => service.to_string(),
        "decision" => decision,
        "reason" => reason
    )
    .increment(1);
}

pub fn record_consumed(service: &str, remaining: u32) {
    counter!("retry_budget_consumed_total", "service" => service.to_string()).increment(1);
    gauge!("retry_budget_remaining", "service" => service.to_string()).set(remaining as f64);
}

pub fn record_average_latency(service: &str, mean_ms: f64) {
    gauge!("retry_budget_average_latency_ms", "service" => service.to_string()).set(mean_ms);
}

pub fn record_refresh(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("retry_budget_refresh_total", "outcome" => outcome).increment(1);
}
