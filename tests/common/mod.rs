//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;

use retry_budget::budget::{HealthStatus, RetryBudget};
use retry_budget::clock::{Clock, ManualClock};
use retry_budget::store::{InMemoryStore, KeyValueStore, StoreError};
use retry_budget::{BudgetConfig, Components};

pub const START_MS: u64 = 1_700_000_000_000;

/// Components on an in-memory store and a manual clock.
pub fn components(config: BudgetConfig) -> (Components, ManualClock, Arc<InMemoryStore>) {
    let clock = ManualClock::new(START_MS);
    let store = Arc::new(InMemoryStore::with_clock(Arc::new(clock.clone())));
    let components = Components::build(config, store.clone(), Arc::new(clock.clone()));
    (components, clock, store)
}

/// Components on an arbitrary store.
pub fn components_on(store: Arc<dyn KeyValueStore>, clock: &ManualClock) -> Components {
    Components::build(test_config(), store, Arc::new(clock.clone()))
}

/// Default config with zero client delays.
pub fn test_config() -> BudgetConfig {
    let mut config = BudgetConfig::default();
    config.client.retry_delay_ms = 0;
    config.client.defer_delay_ms = 0;
    config
}

/// Record `count` requests with the same latency, `failures` of them failed.
pub async fn record_many(
    c: &Components,
    service: &str,
    latency_ms: u64,
    count: usize,
    failures: usize,
) {
    for i in 0..count {
        c.aggregator
            .record_request(service, latency_ms, i >= failures)
            .await
            .unwrap();
    }
}

/// A hand-built budget that stays valid for a minute.
pub fn budget(
    service: &str,
    health: HealthStatus,
    remaining: u32,
    clock: &ManualClock,
) -> RetryBudget {
    RetryBudget {
        service_name: service.to_string(),
        allocated_budget: remaining,
        used_budget: 0,
        remaining_budget: remaining,
        health_status: health,
        latency_factor: 1.0,
        error_factor: 1.0,
        last_calculated_ms: clock.now_millis(),
        expires_at_ms: clock.now_millis() + 60_000,
    }
}

/// Store wrapper that, once armed, holds every read of a matching key at
/// a barrier so that `parties` concurrent readers all read before any of
/// them writes. Also counts writes to matching keys.
pub struct InterleavingStore {
    inner: InMemoryStore,
    prefix: String,
    barrier: Barrier,
    armed: AtomicBool,
    writes: AtomicUsize,
}

impl InterleavingStore {
    pub fn new(inner: InMemoryStore, prefix: &str, parties: usize) -> Self {
        Self {
            inner,
            prefix: prefix.to_string(),
            barrier: Barrier::new(parties),
            armed: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn arm(&self) {
        self.writes.store(0, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for InterleavingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.inner.get(key).await?;
        if self.armed.load(Ordering::SeqCst) && key.starts_with(&self.prefix) {
            self.barrier.wait().await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        if key.starts_with(&self.prefix) {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    async fn list_keys(&self, prefix: &str) -> Result<HashSet<String>, StoreError> {
        self.inner.list_keys(prefix).await
    }
}

/// Store wrapper that fails reads and writes of keys containing `poison`,
/// or everything when `poison` is empty.
pub struct FailingStore {
    inner: InMemoryStore,
    poison: String,
}

impl FailingStore {
    pub fn new(inner: InMemoryStore, poison: &str) -> Self {
        Self {
            inner,
            poison: poison.to_string(),
        }
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.poison.is_empty() || key.contains(&self.poison) {
            Err(StoreError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        self.check(key)?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check(key)?;
        self.inner.delete(key).await
    }

    async fn list_keys(&self, prefix: &str) -> Result<HashSet<String>, StoreError> {
        if self.poison.is_empty() {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.inner.list_keys(prefix).await
    }
}
