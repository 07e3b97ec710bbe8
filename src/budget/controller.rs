//! Cached budget computation.
//!
//! `get_budget` serves the stored budget until `expires_at_ms` and
//! recomputes on miss or expiry. Recomputation always starts a fresh
//! allowance with nothing used. The read, recompute, write sequence is not
//! atomic: concurrent readers of a stale budget may each recompute and
//! write.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::MetricsAggregator;
use crate::analysis::{analyze, HealthCalculator};
use crate::budget::RetryBudget;
use crate::clock::Clock;
use crate::config::BudgetConfig;
use crate::error::{BudgetError, BudgetResult};
use crate::store::{BudgetRepository, MetricsRepository};

/// Outcome of refreshing every known service.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<(String, BudgetError)>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Computes, caches and serves [`RetryBudget`]s.
#[derive(Clone)]
pub struct BudgetController {
    aggregator: MetricsAggregator,
    calculator: HealthCalculator,
    budgets: BudgetRepository,
    metrics: MetricsRepository,
    clock: Arc<dyn Clock>,
    base_budget: u32,
    validity: Duration,
}

impl BudgetController {
    pub fn new(
        config: &BudgetConfig,
        aggregator: MetricsAggregator,
        budgets: BudgetRepository,
        metrics: MetricsRepository,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            aggregator,
            calculator: HealthCalculator::new(
                config.latency_thresholds.clone(),
                config.error_rate_thresholds.clone(),
            ),
            budgets,
            metrics,
            clock,
            base_budget: config.base_budget,
            validity: config.update_interval(),
        }
    }

    /// Recompute from current metrics and persist, discarding prior usage.
    pub async fn calculate_budget(&self, service: &str) -> BudgetResult<RetryBudget> {
        let snapshot = self.aggregator.get_metrics(service).await?;
        let stats = analyze(&snapshot);
        let assessment = self
            .calculator
            .assess(&stats, snapshot.error_rate, self.base_budget);

        let now = self.clock.now_millis();
        let budget = RetryBudget {
            service_name: service.to_string(),
            allocated_budget: assessment.allocated_budget,
            used_budget: 0,
            remaining_budget: assessment.allocated_budget,
            health_status: assessment.health_status,
            latency_factor: assessment.latency_factor,
            error_factor: assessment.error_factor,
            last_calculated_ms: now,
            expires_at_ms: now.saturating_add(self.validity.as_millis() as u64),
        };

        self.budgets.save(&budget).await?;

        tracing::debug!(
            service = %service,
            allocated = budget.allocated_budget,
            health = %budget.health_status,
            latency_factor = budget.latency_factor,
            error_factor = budget.error_factor,
            p95 = stats.p95,
            p99 = stats.p99,
            error_rate = snapshot.error_rate,
            "Budget calculated"
        );

        Ok(budget)
    }

    /// Stored budget while valid, otherwise a fresh calculation.
    pub async fn get_budget(&self, service: &str) -> BudgetResult<RetryBudget> {
        let now = self.clock.now_millis();
        match self.budgets.load(service).await? {
            Some(budget) if !budget.is_expired(now) => Ok(budget),
            Some(_) => {
                tracing::trace!(service = %service, "Budget expired, recalculating");
                self.calculate_budget(service).await
            }
            None => self.calculate_budget(service).await,
        }
    }

    /// Persist a budget as-is (used after consumption).
    pub async fn save_budget(&self, budget: &RetryBudget) -> BudgetResult<()> {
        self.budgets.save(budget).await
    }

    /// Names of every service with a stored budget or stored metrics.
    pub async fn known_services(&self) -> BudgetResult<BTreeSet<String>> {
        let mut names: BTreeSet<String> = self.budgets.service_names().await?.into_iter().collect();
        names.extend(self.metrics.service_names().await?);
        Ok(names)
    }

    /// Recalculate every known service, isolating per-service failures.
    pub async fn update_all_budgets(&self) -> BudgetResult<RefreshReport> {
        let services = self.known_services().await?;
        let mut report = RefreshReport::default();

        for service in services {
            match self.calculate_budget(&service).await {
                Ok(_) => report.refreshed.push(service),
                Err(e) => {
                    tracing::error!(service = %service, error = %e, "Failed to recalculate budget");
                    report.failed.push((service, e));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::HealthStatus;
    use crate::clock::ManualClock;
    use crate::store::{InMemoryStore, KeyValueStore};

    struct Fixture {
        controller: BudgetController,
        aggregator: MetricsAggregator,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let config = BudgetConfig::default();
        let clock = ManualClock::new(0);
        let store: Arc<dyn KeyValueStore> =
            Arc::new(InMemoryStore::with_clock(Arc::new(clock.clone())));
        let metrics = MetricsRepository::new(store.clone(), config.store.ttl());
        let aggregator = MetricsAggregator::new(
            metrics.clone(),
            Arc::new(clock.clone()),
            config.evaluation_window(),
        );
        let controller = BudgetController::new(
            &config,
            aggregator.clone(),
            BudgetRepository::new(store, config.store.ttl()),
            metrics,
            Arc::new(clock.clone()),
        );
        Fixture {
            controller,
            aggregator,
            clock,
        }
    }

    #[tokio::test]
    async fn test_unknown_service_gets_full_budget() {
        let f = fixture();
        let budget = f.controller.get_budget("new").await.unwrap();
        assert_eq!(budget.allocated_budget, 5);
        assert_eq!(budget.remaining_budget, 5);
        assert_eq!(budget.health_status, HealthStatus::Healthy);
        assert_eq!(budget.expires_at_ms, 10_000);
    }

    #[tokio::test]
    async fn test_cached_until_expiry() {
        let f = fixture();
        let first = f.controller.get_budget("svc").await.unwrap();

        // Slow requests land but the cached budget is still served
        for _ in 0..20 {
            f.aggregator.record_request("svc", 900, true).await.unwrap();
        }
        f.clock.advance(Duration::from_millis(9_999));
        assert_eq!(f.controller.get_budget("svc").await.unwrap(), first);

        f.clock.advance(Duration::from_millis(1));
        let second = f.controller.get_budget("svc").await.unwrap();
        assert_eq!(second.health_status, HealthStatus::Critical);
        assert_eq!(second.allocated_budget, 0);
        assert_eq!(second.last_calculated_ms, 10_000);
    }

    #[tokio::test]
    async fn test_calculate_resets_usage() {
        let f = fixture();
        let mut budget = f.controller.get_budget("svc").await.unwrap();
        budget.consume();
        budget.consume();
        f.controller.save_budget(&budget).await.unwrap();
        assert_eq!(f.controller.get_budget("svc").await.unwrap().remaining_budget, 3);

        let fresh = f.controller.calculate_budget("svc").await.unwrap();
        assert_eq!(fresh.used_budget, 0);
        assert_eq!(fresh.remaining_budget, 5);
    }

    #[tokio::test]
    async fn test_update_all_covers_metrics_only_services() {
        let f = fixture();
        f.controller.get_budget("a").await.unwrap();
        f.aggregator.record_request("b", 10, true).await.unwrap();

        let report = f.controller.update_all_budgets().await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.refreshed, vec!["a".to_string(), "b".to_string()]);
    }
}
