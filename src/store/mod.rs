//! Shared key-value store subsystem.
//!
//! # Data Flow
//! ```text
//! MetricsAggregator ──▶ MetricsRepository ──┐
//!                                            ├──▶ KeyValueStore (metrics:<svc>, budget:<svc>)
//! BudgetController  ──▶ BudgetRepository  ──┘
//! ```
//!
//! # Design Decisions
//! - The store is an opaque TTL-capable key-value service behind a trait
//! - Values are JSON strings; repositories own encoding and key namespaces
//! - Store-level TTL is a coarse backstop, independent of `expires_at_ms`
//! - No cross-instance locking: reads and writes are independent

pub mod memory;
pub mod repository;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryStore;
pub use repository::{BudgetRepository, MetricsRepository};

/// Failure talking to the backing store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(String),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Operations consumed from the backing key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value that the store may evict after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All live keys starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<HashSet<String>, StoreError>;
}
