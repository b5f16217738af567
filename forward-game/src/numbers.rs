//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Map a unit draw in `[0, 1)` onto `0..len` by flooring, clamped to the last
/// index. Non-finite or negative draws map to 0.
#[must_use]
pub fn floor_unit_to_index(value: f64, len: usize) -> usize {
    if len == 0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let scaled = (value * usize_to_f64(len)).floor();
    cast::<f64, usize>(scaled).map_or(0, |idx| idx.min(len - 1))
}

/// Floor a non-negative value to an index; negatives and NaN map to 0.
#[must_use]
pub fn floor_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// `numerator / denominator`, or 0 when the denominator is zero.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}
