//! Retry budget subsystem.
//!
//! # Data Flow
//! ```text
//! get_budget(service)
//!     → BudgetRepository (budget:<service>)
//!     → fresh? return cached
//!     → stale/missing? controller.rs: metrics → LatencyStats → Assessment
//!         → RetryBudget (used = 0, expires = now + update interval) → save
//!
//! enforcement.rs:
//!     budget → (health, remaining) → ALLOW | DEFER | DENY
//!     consume → remaining - 1 → save
//! ```
//!
//! # Design Decisions
//! - Reads trigger recomputation; any reader observing staleness pays for it
//! - Recomputation resets usage to zero
//! - No per-service locking (see controller.rs and enforcement.rs)

pub mod controller;
pub mod enforcement;
pub mod types;

pub use controller::{BudgetController, RefreshReport};
pub use enforcement::{evaluate, EnforcementAgent, Verdict};
pub use types::{decision_description, health_description, HealthStatus, RetryBudget, RetryDecision};
