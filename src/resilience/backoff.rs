//! Attempt-scaled retry delays with jitter.

use std::time::Duration;
use rand::Rng;

/// Delay before retry number `attempt` (1-based): `base_ms * attempt`
/// plus up to 10% jitter.
pub fn retry_delay(attempt: u32, base_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = base_ms.saturating_mul(attempt as u64);
    Duration::from_millis(delay_ms + jitter(delay_ms))
}

/// Extra wait applied when a retry is deferred: `base_ms * (attempt + 1)`.
pub fn defer_delay(attempt: u32, base_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(attempt as u64 + 1))
}

fn jitter(delay_ms: u64) -> u64 {
    // 0 to 10% of the delay
    let jitter_range = delay_ms / 10;
    if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_scales_with_attempt() {
        assert_eq!(retry_delay(0, 50), Duration::ZERO);

        let d1 = retry_delay(1, 50).as_millis();
        assert!((50..55).contains(&d1));

        let d3 = retry_delay(3, 50).as_millis();
        assert!((150..165).contains(&d3));

        assert_eq!(retry_delay(2, 0), Duration::ZERO);
    }

    #[test]
    fn test_defer_delay() {
        assert_eq!(defer_delay(1, 100), Duration::from_millis(200));
        assert_eq!(defer_delay(2, 100), Duration::from_millis(300));
    }
}
