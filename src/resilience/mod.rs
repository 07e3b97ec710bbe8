//! Resilience subsystem: the calling layer in front of downstream services.
//!
//! # Data Flow
//! ```text
//! Call to service:
//!     → retries.rs (ask EnforcementAgent: ALLOW / DEFER / DENY)
//!     → run the operation, record outcome with MetricsAggregator
//!     → on failure: backoff.rs delay, try again until max_retries
//!     → on successful retry: consume budget, record retry
//!     → request_log.rs (bounded history per service)
//! ```

pub mod backoff;
pub mod request_log;
pub mod retries;

pub use request_log::{RequestLog, RequestLogBook, RequestStatus};
pub use retries::{CallError, CallOutcome, RetryExecutor};
