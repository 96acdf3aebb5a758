//! Shared numeric helpers for report aggregates

/// Round to two decimal places (half away from zero, like SQL `ROUND(x, 2)`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Divide, yielding `None` instead of infinity or NaN when the denominator is zero.
///
/// Aggregates over empty groups must surface as NULL, never as a fake 0.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(ratio(10.0, 4.0), Some(2.5));
/// assert_eq!(ratio(10.0, 0.0), None);
/// ```
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// `part / whole * 100`, rounded to two decimals; `None` when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    ratio(part * 100.0, whole).map(round2)
}
