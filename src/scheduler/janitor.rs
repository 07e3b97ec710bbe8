//! Periodic sweep of expired in-memory store entries.
//!
//! Reads already ignore expired entries, but keys that are never read
//! again (services that stopped reporting) would otherwise stay resident.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::store::InMemoryStore;

pub struct StoreJanitor {
    store: InMemoryStore,
    interval: Duration,
}

impl StoreJanitor {
    pub fn new(store: InMemoryStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Sweep every `interval` until a shutdown signal arrives.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Store janitor starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Store janitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One sweep; returns how many entries were dropped.
    pub fn sweep(&self) -> usize {
        let removed = self.store.purge_expired();
        tracing::trace!(removed, remaining = self.store.len(), "Store sweep finished");
        removed
    }
}
