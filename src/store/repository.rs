//! Typed repositories over the raw key-value store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::ServiceMetrics;
use crate::budget::RetryBudget;
use crate::error::BudgetResult;
use crate::store::KeyValueStore;

pub const METRICS_KEY_PREFIX: &str = "metrics:";
pub const BUDGET_KEY_PREFIX: &str = "budget:";

/// Default store-level TTL for both record kinds.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Persists [`ServiceMetrics`] under `metrics:<service>`.
#[derive(Clone)]
pub struct MetricsRepository {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl MetricsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn save(&self, metrics: &ServiceMetrics) -> BudgetResult<()> {
        let value = serde_json::to_string(metrics)?;
        self.store
            .set(&metrics_key(&metrics.service_name), value, self.ttl)
            .await?;
        Ok(())
    }

    pub async fn load(&self, service: &str) -> BudgetResult<Option<ServiceMetrics>> {
        match self.store.get(&metrics_key(service)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, service: &str) -> BudgetResult<()> {
        self.store.delete(&metrics_key(service)).await?;
        Ok(())
    }

    /// Names of every service with stored metrics.
    pub async fn service_names(&self) -> BudgetResult<HashSet<String>> {
        service_names(self.store.as_ref(), METRICS_KEY_PREFIX).await
    }
}

/// Persists [`RetryBudget`] under `budget:<service>`.
#[derive(Clone)]
pub struct BudgetRepository {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl BudgetRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn save(&self, budget: &RetryBudget) -> BudgetResult<()> {
        let value = serde_json::to_string(budget)?;
        self.store
            .set(&budget_key(&budget.service_name), value, self.ttl)
            .await?;
        Ok(())
    }

    pub async fn load(&self, service: &str) -> BudgetResult<Option<RetryBudget>> {
        match self.store.get(&budget_key(service)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, service: &str) -> BudgetResult<()> {
        self.store.delete(&budget_key(service)).await?;
        Ok(())
    }

    /// Names of every service with a stored budget.
    pub async fn service_names(&self) -> BudgetResult<HashSet<String>> {
        service_names(self.store.as_ref(), BUDGET_KEY_PREFIX).await
    }
}

pub fn metrics_key(service: &str) -> String {
    format!("{METRICS_KEY_PREFIX}{service}")
}

pub fn budget_key(service: &str) -> String {
    format!("{BUDGET_KEY_PREFIX}{service}")
}

async fn service_names(store: &dyn KeyValueStore, prefix: &str) -> BudgetResult<HashSet<String>> {
    let keys = store.list_keys(prefix).await?;
    Ok(keys
        .into_iter()
        .filter_map(|key| key.strip_prefix(prefix).map(str::to_string))
        .collect())
}
