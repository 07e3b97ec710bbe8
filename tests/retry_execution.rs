//! The budget-aware retry loop against scripted downstream operations.

use std::future::Ready;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use retry_budget::budget::HealthStatus;
use retry_budget::resilience::{CallError, RequestStatus};
use retry_budget::BudgetError;

mod common;

type Attempt = Ready<Result<&'static str, io::Error>>;

/// Operation that fails `failures` times, then succeeds.
fn scripted(failures: u32) -> (Arc<AtomicU32>, impl FnMut() -> Attempt) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let op = move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(if n < failures {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, format!("attempt {} failed", n + 1)))
        } else {
            Ok("payload")
        })
    };
    (calls, op)
}

#[tokio::test]
async fn test_first_attempt_success_spends_nothing() {
    let (c, _, _) = common::components(common::test_config());
    let (calls, op) = scripted(0);

    let outcome = c.executor.execute("orders", op).await.unwrap();
    assert_eq!(outcome.value, "payload");
    assert_eq!(outcome.retries, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let budget = c.controller.get_budget("orders").await.unwrap();
    assert_eq!(budget.remaining_budget, 5);
    let metrics = c.aggregator.get_metrics("orders").await.unwrap();
    assert_eq!((metrics.total_requests, metrics.retry_count), (1, 0));

    let logs = c.executor.logs().recent("orders");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, RequestStatus::Success);
}

#[tokio::test]
async fn test_successful_retry_consumes_one_unit() {
    let (c, _, _) = common::components(common::test_config());
    let (calls, op) = scripted(2);

    let outcome = c.executor.execute("orders", op).await.unwrap();
    assert_eq!(outcome.retries, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let budget = c.controller.get_budget("orders").await.unwrap();
    assert_eq!(budget.remaining_budget, 4);

    let metrics = c.aggregator.get_metrics("orders").await.unwrap();
    assert_eq!(metrics.total_requests, 3);
    assert_eq!(metrics.failed_requests, 2);
    assert_eq!(metrics.retry_count, 1);

    let log = &c.logs.recent("orders")[0];
    assert!(log.success);
    assert_eq!(log.retries, 2);
    assert_eq!(log.attempts.len(), 3);
}

#[tokio::test]
async fn test_persistent_failure_exhausts_retries() {
    let (c, _, _) = common::components(common::test_config());
    let (calls, op) = scripted(u32::MAX);

    let err = c.executor.execute("orders", op).await.unwrap_err();
    match &err {
        CallError::Exhausted { service, retries, last_error } => {
            assert_eq!(service, "orders");
            assert_eq!(*retries, 3);
            assert_eq!(last_error.kind(), io::ErrorKind::ConnectionReset);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_budget_exceeded());
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    // Failed retries never spend budget
    assert_eq!(c.controller.get_budget("orders").await.unwrap().remaining_budget, 5);
    let metrics = c.aggregator.get_metrics("orders").await.unwrap();
    assert_eq!(metrics.failed_requests, 4);
    assert_eq!(metrics.retry_count, 0);

    let log = &c.logs.recent("orders")[0];
    assert_eq!(log.status, RequestStatus::MaxRetries);
    assert!(!log.success);
}

#[tokio::test]
async fn test_critical_service_is_never_called() {
    let (c, clock, _) = common::components(common::test_config());
    let critical = common::budget("orders", HealthStatus::Critical, 5, &clock);
    c.controller.save_budget(&critical).await.unwrap();
    let (calls, op) = scripted(0);

    let err = c.executor.execute("orders", op).await.unwrap_err();
    assert!(err.is_budget_exceeded());
    match &err {
        CallError::Budget(BudgetError::BudgetExceeded { service, remaining }) => {
            assert_eq!(service, "orders");
            assert_eq!(*remaining, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(c.logs.recent("orders")[0].status, RequestStatus::BudgetExceeded);
}

#[tokio::test]
async fn test_budget_runs_out_mid_call() {
    let (c, clock, _) = common::components(common::test_config());
    let empty = common::budget("orders", HealthStatus::Healthy, 0, &clock);
    c.controller.save_budget(&empty).await.unwrap();
    let (calls, op) = scripted(1);

    let err = c.executor.execute("orders", op).await.unwrap_err();
    assert!(matches!(
        err,
        CallError::Budget(BudgetError::BudgetExceeded { remaining: 0, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_degraded_service_retries_after_deferral() {
    let (c, clock, _) = common::components(common::test_config());
    let degraded = common::budget("orders", HealthStatus::Degraded, 3, &clock);
    c.controller.save_budget(&degraded).await.unwrap();
    let (calls, op) = scripted(1);

    let outcome = c.executor.execute("orders", op).await.unwrap();
    assert_eq!(outcome.retries, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(c.controller.get_budget("orders").await.unwrap().remaining_budget, 2);

    let log = &c.logs.recent("orders")[0];
    assert!(log.attempts.iter().any(|a| a.contains("deferred")));
}

#[tokio::test]
async fn test_request_log_is_bounded_and_newest_first() {
    let mut config = common::test_config();
    config.client.request_log_capacity = 3;
    let (c, _, _) = common::components(config);

    for _ in 0..5 {
        let (_, op) = scripted(0);
        c.executor.execute("orders", op).await.unwrap();
    }
    let (_, op) = scripted(1);
    c.executor.execute("orders", op).await.unwrap();

    let logs = c.logs.recent("orders");
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].retries, 1);
    assert!(c.logs.recent("unknown").is_empty());
}
