//! Background scheduling.
//!
//! # Data Flow
//! ```text
//! Periodic timer (update_interval_secs)
//!     → refresher.rs
//!     → BudgetController::update_all_budgets
//!     → every budget:<svc> / metrics:<svc> service recalculated
//!
//! Periodic timer (store.purge_interval_secs)
//!     → janitor.rs
//!     → InMemoryStore::purge_expired
//! ```
//!
//! # Design Decisions
//! - Cycles are isolated: errors are logged, the loop keeps going
//! - One service failing does not skip the rest of the cycle
//! - Stops on the shared shutdown broadcast

pub mod janitor;
pub mod refresher;

pub use janitor::StoreJanitor;
pub use refresher::BudgetRefresher;
