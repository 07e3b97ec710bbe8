//! Records request outcomes into per-service metrics.

use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::ServiceMetrics;
use crate::clock::Clock;
use crate::error::BudgetResult;
use crate::observability::metrics;
use crate::store::MetricsRepository;

/// Owner of every [`ServiceMetrics`] record.
///
/// Each mutation is a load, modify, save sequence against the store with
/// no locking, so concurrent writers to one service are last-writer-wins.
#[derive(Clone)]
pub struct MetricsAggregator {
    repository: MetricsRepository,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl MetricsAggregator {
    pub fn new(repository: MetricsRepository, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            repository,
            clock,
            window,
        }
    }

    /// Count one request outcome and keep its latency sample.
    pub async fn record_request(
        &self,
        service: &str,
        latency_ms: u64,
        success: bool,
    ) -> BudgetResult<ServiceMetrics> {
        let now = self.clock.now_millis();
        let mut snapshot = match self.repository.load(service).await? {
            Some(existing) => existing,
            None => self.fresh(service),
        };

        snapshot.record(latency_ms, success, now);
        self.repository.save(&snapshot).await?;

        metrics::record_request_outcome(service, success);
        metrics::record_average_latency(service, snapshot.latencies.mean());
        tracing::trace!(
            service = %service,
            latency_ms,
            success,
            error_rate = snapshot.error_rate,
            "Recorded request"
        );

        Ok(snapshot)
    }

    /// Bump the retry counter without touching request counters or samples.
    pub async fn record_retry(&self, service: &str) -> BudgetResult<ServiceMetrics> {
        let now = self.clock.now_millis();
        let mut snapshot = match self.repository.load(service).await? {
            Some(existing) => existing,
            None => self.fresh(service),
        };

        snapshot.record_retry(now);
        self.repository.save(&snapshot).await?;

        metrics::record_retry(service);
        Ok(snapshot)
    }

    /// Current snapshot, creating and persisting an empty one if missing.
    pub async fn get_metrics(&self, service: &str) -> BudgetResult<ServiceMetrics> {
        if let Some(existing) = self.repository.load(service).await? {
            return Ok(existing);
        }

        let snapshot = self.fresh(service);
        self.repository.save(&snapshot).await?;
        tracing::debug!(service = %service, "Initialized empty metrics");
        Ok(snapshot)
    }

    /// Replace the stored snapshot with an all-zero one.
    pub async fn reset_metrics(&self, service: &str) -> BudgetResult<ServiceMetrics> {
        let snapshot = self.fresh(service);
        self.repository.save(&snapshot).await?;
        tracing::info!(service = %service, "Metrics reset");
        Ok(snapshot)
    }

    fn fresh(&self, service: &str) -> ServiceMetrics {
        ServiceMetrics::new(
            service,
            self.clock.now_millis(),
            self.window.as_millis() as u64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::SAMPLE_CAPACITY;
    use crate::clock::ManualClock;
    use crate::store::repository::DEFAULT_TTL;
    use crate::store::{InMemoryStore, KeyValueStore};

    fn aggregator() -> (MetricsAggregator, Arc<dyn KeyValueStore>, ManualClock) {
        let clock = ManualClock::new(1_000);
        let store: Arc<dyn KeyValueStore> =
            Arc::new(InMemoryStore::with_clock(Arc::new(clock.clone())));
        let aggregator = MetricsAggregator::new(
            MetricsRepository::new(store.clone(), DEFAULT_TTL),
            Arc::new(clock.clone()),
            Duration::from_secs(60),
        );
        (aggregator, store, clock)
    }

    #[tokio::test]
    async fn test_first_request_initializes_metrics() {
        let (agg, store, _) = aggregator();
        let m = agg.record_request("orders", 120, true).await.unwrap();

        assert_eq!(m.total_requests, 1);
        assert_eq!(m.successful_requests, 1);
        assert_eq!(m.window_start_ms, 1_000);
        assert_eq!(m.window_end_ms, 61_000);
        assert!(store.get("metrics:orders").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_persists_between_calls() {
        let (agg, _, clock) = aggregator();
        agg.record_request("orders", 100, true).await.unwrap();
        clock.advance(Duration::from_millis(5));
        agg.record_request("orders", 300, false).await.unwrap();

        let m = agg.get_metrics("orders").await.unwrap();
        assert_eq!(m.total_requests, 2);
        assert_eq!(m.failed_requests, 1);
        assert_eq!(m.error_rate, 50.0);
        assert_eq!(m.latencies.to_vec(), vec![100, 300]);
        assert_eq!(m.last_updated_ms, 1_005);
    }

    #[tokio::test]
    async fn test_get_metrics_never_missing() {
        let (agg, store, _) = aggregator();
        let m = agg.get_metrics("fresh").await.unwrap();
        assert_eq!(m.total_requests, 0);
        assert_eq!(m.error_rate, 0.0);
        assert!(store.get("metrics:fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_retry_only_touches_retry_counter() {
        let (agg, _, _) = aggregator();
        agg.record_request("orders", 50, true).await.unwrap();
        let m = agg.record_retry("orders").await.unwrap();
        assert_eq!(m.retry_count, 1);
        assert_eq!(m.total_requests, 1);
        assert_eq!(m.latencies.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_then_record() {
        let (agg, _, _) = aggregator();
        for _ in 0..5 {
            agg.record_request("orders", 10, true).await.unwrap();
        }

        agg.reset_metrics("orders").await.unwrap();
        let m = agg.record_request("orders", 10, false).await.unwrap();
        assert_eq!(m.total_requests, 1);
        assert_eq!(m.error_rate, 100.0);

        agg.reset_metrics("orders").await.unwrap();
        let m = agg.record_request("orders", 10, true).await.unwrap();
        assert_eq!(m.total_requests, 1);
        assert_eq!(m.error_rate, 0.0);
    }

    #[tokio::test]
    async fn test_sample_buffer_is_bounded() {
        let (agg, _, _) = aggregator();
        let total = SAMPLE_CAPACITY as u64 + 25;
        for latency in 0..total {
            agg.record_request("busy", latency, true).await.unwrap();
        }

        let m = agg.get_metrics("busy").await.unwrap();
        assert_eq!(m.total_requests, total);
        assert_eq!(m.latencies.len(), SAMPLE_CAPACITY);
        assert_eq!(m.latencies.iter().next(), Some(25));
    }
}
