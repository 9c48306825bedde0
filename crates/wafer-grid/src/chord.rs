//! Circle chord primitives.

use crate::error::DomainError;

/// Length of the chord of a circle of `radius` at `perpendicular_offset`
/// from its centre: `2·√(r² − h²)`.
///
/// Fails if `|perpendicular_offset| > radius`.
pub fn chord_length(radius: f64, perpendicular_offset: f64) -> Result<f64, DomainError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(DomainError::NonPositiveDiameter(2.0 * radius));
    }
    if !perpendicular_offset.is_finite() || perpendicular_offset.abs() > radius {
        return Err(DomainError::OffsetOutsideCircle {
            radius,
            offset: perpendicular_offset,
        });
    }
    let half_sq = radius * radius - perpendicular_offset * perpendicular_offset;
    // |h| <= r can still leave a tiny negative residue for |h| == r.
    Ok(2.0 * half_sq.max(0.0).sqrt())
}

/// Perpendicular offset of the outermost grid line at `index`.
///
/// The extreme row or column is placed at the wafer's cardinal tangent
/// point: `+radius` for positive indices, `-radius` for negative ones.
/// Index 0 has no defined side and is rejected.
pub fn signed_radius_at(radius: f64, index: i32) -> Result<f64, DomainError> {
    match index.signum() {
        1 => Ok(radius),
        -1 => Ok(-radius),
        _ => Err(DomainError::ZeroBoundaryIndex {
            what: "boundary index",
        }),
    }
}
