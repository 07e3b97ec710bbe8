//! Retry admission decisions.
//!
//! # State Transitions
//! ```text
//! (health, remaining)          decision
//! CRITICAL, *               →  DENY   (reason: critical)
//! *, 0                      →  DENY   (reason: exceeded)
//! DEGRADED, > 0             →  DEFER
//! HEALTHY, > 0              →  ALLOW
//! ```
//! Rules are checked top to bottom; the first match wins.

use crate::budget::controller::BudgetController;
use crate::budget::{HealthStatus, RetryBudget, RetryDecision};
use crate::error::BudgetResult;
use crate::observability::metrics;

/// Decision plus the label used for the decision counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub decision: RetryDecision,
    pub reason: &'static str,
}

/// Apply the admission rules to a budget.
pub fn evaluate(budget: &RetryBudget) -> Verdict {
    let (decision, reason) = if budget.health_status == HealthStatus::Critical {
        (RetryDecision::Deny, "critical")
    } else if budget.remaining_budget == 0 {
        (RetryDecision::Deny, "exceeded")
    } else if budget.health_status == HealthStatus::Degraded {
        (RetryDecision::Defer, "degraded")
    } else {
        (RetryDecision::Allow, "ok")
    };
    Verdict { decision, reason }
}

/// Turns budgets into retry decisions and spends them.
#[derive(Clone)]
pub struct EnforcementAgent {
    controller: BudgetController,
}

impl EnforcementAgent {
    pub fn new(controller: BudgetController) -> Self {
        Self { controller }
    }

    /// Decide whether `service` may be retried now.
    pub async fn check_retry_allowed(&self, service: &str) -> BudgetResult<RetryDecision> {
        Ok(self.check(service).await?.0)
    }

    /// Decision together with the budget it was made from.
    pub async fn check(&self, service: &str) -> BudgetResult<(RetryDecision, RetryBudget)> {
        let budget = self.controller.get_budget(service).await?;
        let verdict = evaluate(&budget);

        metrics::record_decision(service, verdict.decision, verdict.reason);
        match verdict.decision {
            RetryDecision::Deny => tracing::warn!(
                service = %service,
                reason = verdict.reason,
                remaining = budget.remaining_budget,
                health = %budget.health_status,
                "Retry denied"
            ),
            RetryDecision::Defer => tracing::info!(
                service = %service,
                remaining = budget.remaining_budget,
                "Retry deferred, service degraded"
            ),
            RetryDecision::Allow => tracing::debug!(
                service = %service,
                remaining = budget.remaining_budget,
                "Retry allowed"
            ),
        }

        Ok((verdict.decision, budget))
    }

    /// Spend one unit of the current budget and persist it.
    ///
    /// Not atomic: two concurrent consumers can read the same remaining
    /// value and both write `remaining - 1`.
    pub async fn consume_budget(&self, service: &str) -> BudgetResult<RetryBudget> {
        let mut budget = self.controller.get_budget(service).await?;
        if !budget.consume() {
            tracing::debug!(service = %service, "Budget already exhausted, nothing consumed");
        }
        self.controller.save_budget(&budget).await?;

        metrics::record_consumed(service, budget.remaining_budget);
        Ok(budget)
    }

    pub async fn is_service_healthy(&self, service: &str) -> BudgetResult<bool> {
        let budget = self.controller.get_budget(service).await?;
        Ok(budget.health_status == HealthStatus::Healthy)
    }

    pub fn controller(&self) -> &BudgetController {
        &self.controller
    }
}
