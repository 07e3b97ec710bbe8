//! Per-service request counters and latency samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of latency samples retained per service.
pub const SAMPLE_CAPACITY: usize = 1000;

/// Bounded FIFO of recent latency samples in milliseconds.
///
/// Pushing beyond [`SAMPLE_CAPACITY`] evicts the oldest sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatencySamples {
    samples: VecDeque<u64>,
}

impl LatencySamples {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SAMPLE_CAPACITY),
        }
    }

    /// Append a sample, evicting from the front when full.
    pub fn push(&mut self, latency_ms: u64) {
        while self.samples.len() >= SAMPLE_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(latency_ms);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().copied()
    }

    /// Copy of the samples as a contiguous vector.
    pub fn to_vec(&self) -> Vec<u64> {
        self.samples.iter().copied().collect()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64
    }
}

/// Rolling view of one service's request outcomes.
///
/// Invariant: `successful_requests + failed_requests <= total_requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub service_name: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub retry_count: u64,
    /// Percentage of failed requests, 0..=100.
    pub error_rate: f64,
    pub latencies: LatencySamples,
    pub last_updated_ms: u64,
    /// Informational only; samples are not evicted by window.
    pub window_start_ms: u64,
    pub window_end_ms: u64,
}

impl ServiceMetrics {
    /// Fresh all-zero metrics whose window starts at `now_ms`.
    pub fn new(service_name: impl Into<String>, now_ms: u64, window_ms: u64) -> Self {
        Self {
            service_name: service_name.into(),
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            retry_count: 0,
            error_rate: 0.0,
            latencies: LatencySamples::new(),
            last_updated_ms: now_ms,
            window_start_ms: now_ms,
            window_end_ms: now_ms.saturating_add(window_ms),
        }
    }

    /// Count one request outcome and keep its latency.
    pub fn record(&mut self, latency_ms: u64, success: bool, now_ms: u64) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        self.latencies.push(latency_ms);
        self.recalculate_error_rate();
        self.last_updated_ms = now_ms;
    }

    pub fn record_retry(&mut self, now_ms: u64) {
        self.retry_count += 1;
        self.last_updated_ms = now_ms;
    }

    fn recalculate_error_rate(&mut self) {
        self.error_rate = if self.total_requests > 0 {
            self.failed_requests as f64 / self.total_requests as f64 * 100.0
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_evict_oldest_first() {
        let mut samples = LatencySamples::new();
        for i in 0..(SAMPLE_CAPACITY as u64 + 5) {
            samples.push(i);
        }
        assert_eq!(samples.len(), SAMPLE_CAPACITY);
        assert_eq!(samples.iter().next(), Some(5));
        assert_eq!(samples.iter().last(), Some(SAMPLE_CAPACITY as u64 + 4));
    }

    #[test]
    fn test_error_rate_tracks_failures() {
        let mut m = ServiceMetrics::new("svc", 0, 60_000);
        assert_eq!(m.error_rate, 0.0);

        m.record(10, true, 1);
        m.record(10, true, 2);
        m.record(10, true, 3);
        m.record(10, false, 4);

        assert_eq!(m.total_requests, 4);
        assert_eq!(m.failed_requests, 1);
        assert!((m.error_rate - 25.0).abs() < f64::EPSILON);
        assert_eq!(m.last_updated_ms, 4);
        assert!(m.successful_requests + m.failed_requests <= m.total_requests);
    }

    #[test]
    fn test_retry_leaves_request_counters_alone() {
        let mut m = ServiceMetrics::new("svc", 0, 60_000);
        m.record_retry(5);
        assert_eq!(m.retry_count, 1);
        assert_eq!(m.total_requests, 0);
        assert!(m.latencies.is_empty());
    }

    #[test]
    fn test_serializes_samples_as_plain_list() {
        let mut m = ServiceMetrics::new("svc", 0, 1_000);
        m.record(42, true, 1);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["latencies"], serde_json::json!([42]));
        assert_eq!(json["window_end_ms"], 1_000);
    }
}
