//! Numeric primitives shared by the ratio, scoring and signal code.
//!
//! Functions that can be undefined for their input return `Option<f64>` (`None` meaning
//! "not computable"). Functions with a documented fallback (`percentile_in_range`,
//! `safe_divide`) return that fallback instead; a fallback is not evidence of signal strength.

use std::cmp::Ordering;

/// Median of `values`, or `None` for an empty slice. The input is not reordered.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentile rank of `value` within `reference` on a 0-100 scale.
///
/// Counts only reference values strictly below `value`; ties are not "below".
/// An empty reference set carries no information and yields 50.
pub fn percentile_rank(value: f64, reference: &[f64]) -> f64 {
    if reference.is_empty() {
        return 50.0;
    }
    let count_below = reference.iter().filter(|&&x| x < value).count();
    100.0 * count_below as f64 / reference.len() as f64
}

/// Position of `value` between `min` and `max` mapped linearly onto 0-100 and clamped.
/// A degenerate range (`max <= min`) yields 50.
pub fn percentile_in_range(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 50.0;
    }
    clamp((value - min) / (max - min) * 100.0, 0.0, 100.0)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// `numerator / denominator`, or 0 when the denominator is exactly zero.
///
/// The zero fallback is indistinguishable from a genuine zero ratio; callers that need
/// to tell them apart must check the denominator themselves.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentage change from `previous` to `current`.
/// `None` when `previous <= 0`, since growth against a non-positive base is meaningless.
pub fn growth_rate(current: f64, previous: f64) -> Option<f64> {
    if previous <= 0.0 {
        return None;
    }
    Some(100.0 * (current - previous) / previous)
}

/// Keeps finite values only; NaN and infinities become "not computable".
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
