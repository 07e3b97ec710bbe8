//! Error definitions shared by the stateful components.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the aggregator, controller and enforcement agent.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// The backing key-value store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A retry was denied and the caller treats that as a hard failure.
    #[error("retry budget exceeded for service '{service}' (remaining budget: {remaining})")]
    BudgetExceeded { service: String, remaining: u32 },

    /// The service identifier was rejected at the calling boundary.
    #[error("invalid service identifier: {0:?}")]
    InvalidService(String),
}

impl From<StoreError> for BudgetError {
    fn from(err: StoreError) -> Self {
        BudgetError::StoreUnavailable(err.to_string())
    }
}

/// Result type for budget operations.
pub type BudgetResult<T> = Result<T, BudgetError>;

/// Maximum accepted length of a service identifier.
pub const MAX_SERVICE_NAME_LEN: usize = 128;

/// Validate a service identifier supplied by a caller.
///
/// Accepts ASCII alphanumerics plus `.`, `_` and `-`.
pub fn validate_service_name(name: &str) -> BudgetResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_SERVICE_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));

    if valid {
        Ok(())
    } else {
        Err(BudgetError::InvalidService(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_validation() {
        assert!(validate_service_name("payments-api").is_ok());
        assert!(validate_service_name("svc_1.internal").is_ok());

        assert!(matches!(validate_service_name(""), Err(BudgetError::InvalidService(_))));
        assert!(validate_service_name("has space").is_err());
        assert!(validate_service_name("budget:evil").is_err());
        assert!(validate_service_name(&"a".repeat(MAX_SERVICE_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_budget_exceeded_message_carries_context() {
        let err = BudgetError::BudgetExceeded {
            service: "orders".into(),
            remaining: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("remaining budget: 0"));
    }

    #[test]
    fn test_store_error_maps_to_unavailable() {
        let err: BudgetError = StoreError::Unavailable("connection refused".into()).into();
        assert!(matches!(
            err,
            BudgetError::StoreUnavailable(ref m) if m.contains("connection refused")
        ));
    }
}
