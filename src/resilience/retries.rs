//! Budget-aware retry loop for outbound calls.
//!
//! # Responsibilities
//! - Ask the enforcement agent before every attempt
//! - Record each attempt's outcome and latency with the aggregator
//! - Spend budget only for retries that succeed
//! - Keep a bounded request log per service
//!
//! # Design Decisions
//! - At most `1 + max_retries` attempts
//! - DENY ends the call with `BudgetExceeded`, distinct from downstream failure
//! - DEFER on a retry waits longer, it does not skip the attempt
//! - Delays are plain sleeps; an in-flight wait is not cancellable

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::time::sleep;

use crate::aggregator::MetricsAggregator;
use crate::budget::{EnforcementAgent, RetryDecision};
use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::error::BudgetError;
use crate::resilience::backoff::{defer_delay, retry_delay};
use crate::resilience::request_log::{RequestLog, RequestLogBook, RequestStatus};

/// Why a call through [`RetryExecutor`] did not produce a value.
#[derive(Debug, Error)]
pub enum CallError<E>
where
    E: std::error::Error + 'static,
{
    /// Admission control refused the attempt or the store failed.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Every permitted attempt failed downstream.
    #[error("request to '{service}' failed after {retries} retries: {last_error}")]
    Exhausted {
        service: String,
        retries: u32,
        #[source]
        last_error: E,
    },
}

impl<E> CallError<E>
where
    E: std::error::Error + 'static,
{
    /// True when the call was stopped by the retry budget.
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, CallError::Budget(BudgetError::BudgetExceeded { .. }))
    }
}

/// A successful call and what it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome<T> {
    pub value: T,
    pub retries: u32,
    pub duration_ms: u64,
}

/// Runs operations against a service under its retry budget.
#[derive(Clone)]
pub struct RetryExecutor {
    agent: EnforcementAgent,
    aggregator: MetricsAggregator,
    logs: RequestLogBook,
    clock: Arc<dyn Clock>,
    config: ClientConfig,
}

impl RetryExecutor {
    pub fn new(
        agent: EnforcementAgent,
        aggregator: MetricsAggregator,
        logs: RequestLogBook,
        clock: Arc<dyn Clock>,
        config: ClientConfig,
    ) -> Self {
        Self {
            agent,
            aggregator,
            logs,
            clock,
            config,
        }
    }

    pub fn logs(&self) -> &RequestLogBook {
        &self.logs
    }

    /// Call `op` until it succeeds, the budget denies, or attempts run out.
    pub async fn execute<T, E, F, Fut>(
        &self,
        service: &str,
        mut op: F,
    ) -> Result<CallOutcome<T>, CallError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        let mut attempts = Vec::new();

        loop {
            let (decision, budget) = self.agent.check(service).await?;

            if decision == RetryDecision::Deny {
                let msg = format!("Retry denied for {} - budget exceeded", service);
                tracing::warn!(service = %service, attempt = attempt + 1, "{}", msg);
                attempts.push(msg);
                self.log(service, false, started, attempt, RequestStatus::BudgetExceeded, attempts);
                return Err(CallError::Budget(BudgetError::BudgetExceeded {
                    service: service.to_string(),
                    remaining: budget.remaining_budget,
                }));
            }

            if decision == RetryDecision::Defer && attempt > 0 {
                let msg = format!("Retry deferred for {} - service degraded", service);
                tracing::info!(service = %service, attempt = attempt + 1, "{}", msg);
                attempts.push(msg);
                sleep(defer_delay(attempt, self.config.defer_delay_ms)).await;
            }

            let attempt_started = Instant::now();
            let result = op().await;
            let latency_ms = attempt_started.elapsed().as_millis() as u64;

            match result {
                Ok(value) => {
                    self.aggregator.record_request(service, latency_ms, true).await?;
                    if attempt > 0 {
                        self.agent.consume_budget(service).await?;
                        self.aggregator.record_retry(service).await?;
                    }

                    let msg = format!(
                        "Request to {} succeeded (attempt {}, latency: {}ms)",
                        service,
                        attempt + 1,
                        latency_ms
                    );
                    tracing::info!(
                        service = %service,
                        attempt = attempt + 1,
                        latency_ms,
                        "Request succeeded"
                    );
                    attempts.push(msg);
                    let duration_ms =
                        self.log(service, true, started, attempt, RequestStatus::Success, attempts);

                    return Ok(CallOutcome {
                        value,
                        retries: attempt,
                        duration_ms,
                    });
                }
                Err(e) => {
                    let msg =
                        format!("Request to {} failed (attempt {}): {}", service, attempt + 1, e);
                    tracing::error!(
                        service = %service,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed"
                    );
                    attempts.push(msg);
                    self.aggregator.record_request(service, latency_ms, false).await?;

                    if attempt >= self.config.max_retries {
                        let status = RequestStatus::MaxRetries;
                        self.log(service, false, started, attempt, status, attempts);
                        return Err(CallError::Exhausted {
                            service: service.to_string(),
                            retries: attempt,
                            last_error: e,
                        });
                    }

                    attempt += 1;
                    sleep(retry_delay(attempt, self.config.retry_delay_ms)).await;
                }
            }
        }
    }

    fn log(
        &self,
        service: &str,
        success: bool,
        started: Instant,
        retries: u32,
        status: RequestStatus,
        attempts: Vec<String>,
    ) -> u64 {
        let duration_ms = started.elapsed().as_millis() as u64;
        self.logs.push(RequestLog {
            timestamp_ms: self.clock.now_millis(),
            service: service.to_string(),
            success,
            duration_ms,
            retries,
            status,
            attempts,
        });
        duration_ms
    }
}
