//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize all subsystems in dependency order
//! - Hand out the pieces background tasks and the API need
//!
//! # Design Decisions
//! - Store and clock are injected; nothing here picks a store technology
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use crate::aggregator::MetricsAggregator;
use crate::api::AppState;
use crate::budget::{BudgetController, EnforcementAgent};
use crate::clock::Clock;
use crate::config::BudgetConfig;
use crate::resilience::{RequestLogBook, RetryExecutor};
use crate::scheduler::BudgetRefresher;
use crate::store::{BudgetRepository, KeyValueStore, MetricsRepository};

/// Every long-lived component, wired together.
#[derive(Clone)]
pub struct Components {
    pub config: BudgetConfig,
    pub aggregator: MetricsAggregator,
    pub controller: BudgetController,
    pub agent: EnforcementAgent,
    pub executor: RetryExecutor,
    pub logs: RequestLogBook,
}

impl Components {
    pub fn build(
        config: BudgetConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ttl = config.store.ttl();
        let metrics_repo = MetricsRepository::new(store.clone(), ttl);
        let budget_repo = BudgetRepository::new(store, ttl);

        let aggregator = MetricsAggregator::new(
            metrics_repo.clone(),
            clock.clone(),
            config.evaluation_window(),
        );
        let controller = BudgetController::new(
            &config,
            aggregator.clone(),
            budget_repo,
            metrics_repo,
            clock.clone(),
        );
        let agent = EnforcementAgent::new(controller.clone());
        let logs = RequestLogBook::new(config.client.request_log_capacity);
        let executor = RetryExecutor::new(
            agent.clone(),
            aggregator.clone(),
            logs.clone(),
            clock,
            config.client.clone(),
        );

        tracing::debug!(
            base_budget = config.base_budget,
            update_interval_secs = config.update_interval_secs,
            "Components initialized"
        );

        Self {
            config,
            aggregator,
            controller,
            agent,
            executor,
            logs,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            aggregator: self.aggregator.clone(),
            controller: self.controller.clone(),
            agent: self.agent.clone(),
            logs: self.logs.clone(),
        }
    }

    pub fn refresher(&self) -> BudgetRefresher {
        BudgetRefresher::new(self.controller.clone(), self.config.update_interval())
    }
}
