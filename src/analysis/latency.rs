//! Latency snapshot derived from a service's samples.

use serde::{Deserialize, Serialize};

use crate::aggregator::ServiceMetrics;
use crate::analysis::percentile::{mean, percentile_sorted, standard_deviation};

/// Immutable summary of a latency sample set.
///
/// Every field is zero when `sample_size == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub mean: f64,
    pub standard_deviation: f64,
    pub min: u64,
    pub max: u64,
    pub sample_size: usize,
}

impl LatencyStats {
    /// Summarise raw samples in any order.
    pub fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        Self {
            p50: percentile_sorted(&sorted, 50.0),
            p95: percentile_sorted(&sorted, 95.0),
            p99: percentile_sorted(&sorted, 99.0),
            mean: mean(&sorted),
            standard_deviation: standard_deviation(&sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            sample_size: sorted.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_size == 0
    }
}

/// Compute latency statistics for a metrics snapshot.
pub fn analyze(metrics: &ServiceMetrics) -> LatencyStats {
    LatencyStats::from_samples(&metrics.latencies.to_vec())
}
