//! Rounding helpers for reported figures.

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fraction expressed as a percentage rounded to 2 decimals.
pub fn to_percent(fraction: f64) -> f64 {
    round2(fraction * 100.0)
}
