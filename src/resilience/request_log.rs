//! Bounded per-service log of completed calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// How a call through the retrying caller ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Success,
    BudgetExceeded,
    MaxRetries,
}

/// One completed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLog {
    pub timestamp_ms: u64,
    pub service: String,
    pub success: bool,
    pub duration_ms: u64,
    pub retries: u32,
    pub status: RequestStatus,
    pub attempts: Vec<String>,
}

/// Newest-first logs, at most `capacity` per service.
#[derive(Clone)]
pub struct RequestLogBook {
    logs: Arc<DashMap<String, Mutex<VecDeque<RequestLog>>>>,
    capacity: usize,
}

impl RequestLogBook {
    pub fn new(capacity: usize) -> Self {
        Self {
            logs: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, entry: RequestLog) {
        let slot = self
            .logs
            .entry(entry.service.clone())
            .or_insert_with(|| Mutex::new(VecDeque::new()));
        let mut entries = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Recent logs for one service, newest first.
    pub fn recent(&self, service: &str) -> Vec<RequestLog> {
        self.logs
            .get(service)
            .map(|slot| {
                let entries = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                entries.iter().cloned().collect()
            })
            .unwrap_or_default()
    }

    pub fn all(&self) -> HashMap<String, Vec<RequestLog>> {
        self.logs
            .iter()
            .map(|r| {
                let entries = r.value().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                (r.key().clone(), entries.iter().cloned().collect())
            })
            .collect()
    }

    pub fn clear(&self) {
        self.logs.clear();
    }
}
