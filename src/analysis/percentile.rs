//! Order statistics over latency samples.
//!
//! All functions are pure and never fail: empty input yields `0.0`.

/// Interpolated percentile of `samples` at `p` (0..=100).
///
/// `p` outside that range is clamped; NaN is treated as `0.0`.
///
/// Uses the `p * (n + 1) / 100` position estimator: positions below the
/// first rank clamp to the minimum, positions at or past the last rank
/// clamp to the maximum, anything between interpolates linearly between
/// the two neighbouring order statistics.
pub fn percentile(samples: &[u64], p: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    percentile_sorted(&sorted, p)
}

/// Like [`percentile`] but for input that is already sorted ascending.
pub fn percentile_sorted(sorted: &[u64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0] as f64;
    }

    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let pos = p * (n as f64 + 1.0) / 100.0;
    if pos < 1.0 {
        return sorted[0] as f64;
    }
    if pos >= n as f64 {
        return sorted[n - 1] as f64;
    }

    let rank = pos.floor();
    let fraction = pos - rank;
    // rank is in 1..n here, so both neighbours exist
    let lower = sorted[rank as usize - 1] as f64;
    let upper = sorted[rank as usize] as f64;
    lower + fraction * (upper - lower)
}

/// Arithmetic mean.
pub fn mean(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation (`n - 1` denominator); `0.0` below two samples.
pub fn standard_deviation(samples: &[u64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let m = mean(samples);
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let d = s as f64 - m;
            d * d
        })
        .sum();
    (sum_sq / (samples.len() - 1) as f64).sqrt()
}
