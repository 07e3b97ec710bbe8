//! In-process store backed by a concurrent map.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: u64,
}

/// A thread-safe TTL store.
///
/// Expired entries are dropped lazily on access and by [`purge_expired`].
///
/// [`purge_expired`]: InMemoryStore::purge_expired
#[derive(Clone)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store that reads time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at_ms > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired store entries");
        }
        removed
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now_millis();
        let value = match self.entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if value.is_none() {
            self.entries.remove_if(key, |_, entry| entry.expires_at_ms <= now);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let expires_at_ms = self
            .clock
            .now_millis()
            .saturating_add(ttl.as_millis() as u64);
        self.entries.insert(key.to_string(), Entry { value, expires_at_ms });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<HashSet<String>, StoreError> {
        let now = self.clock.now_millis();
        Ok(self
            .entries
            .iter()
            .filter(|r| r.key().starts_with(prefix) && r.value().expires_at_ms > now)
            .map(|r| r.key().clone())
            .collect())
    }
}
