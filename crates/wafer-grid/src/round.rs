//! Fixed-precision decimal rounding.
//!
//! Derived grid parameters are part of the output contract at a fixed
//! number of decimals, so rounding is done explicitly: scale, round to an
//! integer, rescale. The two solvers settle ties differently for negative
//! values: boundary counts round ties towards positive infinity, spans
//! round ties away from zero.

/// Decimal places of [`compute_from_boundary_counts`](crate::compute_from_boundary_counts) output.
pub const BOUNDARY_PRECISION: u32 = 4;

/// Decimal places of [`compute_from_spans`](crate::compute_from_spans) output.
pub const SPAN_PRECISION: u32 = 3;

#[inline]
fn rescale(rounded: f64, factor: f64) -> f64 {
    let out = rounded / factor;
    if out == 0.0 {
        0.0
    } else {
        out
    }
}

/// Round `value` to `decimals` places, ties going up (`-2.5 -> -2`, `2.5 -> 3`).
///
/// Negative zero is normalised to `0.0`.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    };
    rescale(rounded, factor)
}

/// Round `value` to `decimals` places, ties going away from zero
/// (`-2.5 -> -3`, `2.5 -> 3`).
///
/// Negative zero is normalised to `0.0`.
pub fn round_half_away_from_zero(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let magnitude = (value.abs() * factor + 0.5).floor();
    rescale(magnitude.copysign(value), factor)
}
