//! Grid parameters and the boundary observations they are derived from.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, DomainError};

/// Die size and grid placement on the wafer.
///
/// `offset_x`/`offset_y` locate the centre of grid cell `(0, 0)` relative
/// to the wafer centre; a die centre is `(x·pitch_x − offset_x, y·pitch_y − offset_y)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DieGridParams {
    pub die_width: f64,
    pub die_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl DieGridParams {
    pub fn new(die_width: f64, die_height: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            die_width,
            die_height,
            offset_x,
            offset_y,
        }
    }

    /// Horizontal centre-to-centre spacing.
    #[inline]
    pub fn pitch_x(&self, scribe_width: f64) -> f64 {
        self.die_width + scribe_width
    }

    /// Vertical centre-to-centre spacing.
    #[inline]
    pub fn pitch_y(&self, scribe_width: f64) -> f64 {
        self.die_height + scribe_width
    }

    /// Centre of die `(x, y)` in wafer coordinates (mm).
    #[inline]
    pub fn die_center(&self, x: i32, y: i32, scribe_width: f64) -> Point2<f64> {
        Point2::new(
            f64::from(x) * self.pitch_x(scribe_width) - self.offset_x,
            f64::from(y) * self.pitch_y(scribe_width) - self.offset_y,
        )
    }

    /// Corners of die `(x, y)`: `[(−,−), (+,−), (−,+), (+,+)]` around the centre.
    pub fn die_corners(&self, x: i32, y: i32, scribe_width: f64) -> [Point2<f64>; 4] {
        let c = self.die_center(x, y, scribe_width);
        let hw = self.die_width / 2.0;
        let hh = self.die_height / 2.0;
        [
            Point2::new(c.x - hw, c.y - hh),
            Point2::new(c.x + hw, c.y - hh),
            Point2::new(c.x - hw, c.y + hh),
            Point2::new(c.x + hw, c.y + hh),
        ]
    }

    /// Require a positive die size and finite offsets.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (what, value) in [("die width", self.die_width), ("die height", self.die_height)] {
            ensure_finite(what, value)?;
            if value <= 0.0 {
                return Err(DomainError::NonPositiveDieSize { what, value });
            }
        }
        ensure_finite("offset x", self.offset_x)?;
        ensure_finite("offset y", self.offset_y)?;
        Ok(())
    }
}

/// Boundary observations expressed as integer grid indices.
///
/// `diex_min`/`diex_max` are the leftmost and rightmost columns that still
/// hold a die, `diey_min`/`diey_max` the lowest and highest rows. The counts
/// are the number of dies observed in those extreme columns and rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryDieConstraints {
    pub diex_min: i32,
    pub diex_max: i32,
    pub diey_min: i32,
    pub diey_max: i32,
    pub die_count_at_xmin: u32,
    pub die_count_at_xmax: u32,
    pub die_count_at_ymin: u32,
    pub die_count_at_ymax: u32,
}

/// Boundary observations expressed as real-valued positions in die-index units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpanDieConstraints {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub xmin_count: u32,
    pub xmax_count: u32,
    pub ymin_count: u32,
    pub ymax_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_center_applies_pitch_and_offset() {
        let p = DieGridParams::new(17.0, 10.0, 5.0, 8.5);
        let c = p.die_center(2, -1, 0.8);
        assert!((c.x - (2.0 * 17.8 - 5.0)).abs() < 1e-12);
        assert!((c.y - (-10.8 - 8.5)).abs() < 1e-12);
    }

    #[test]
    fn corners_span_die_size() {
        let p = DieGridParams::new(4.0, 2.0, 0.0, 0.0);
        let [a, b, c, d] = p.die_corners(0, 0, 0.5);
        assert_eq!(a, Point2::new(-2.0, -1.0));
        assert_eq!(b, Point2::new(2.0, -1.0));
        assert_eq!(c, Point2::new(-2.0, 1.0));
        assert_eq!(d, Point2::new(2.0, 1.0));
    }

    #[test]
    fn validate_rejects_zero_die() {
        let p = DieGridParams::new(0.0, 10.0, 0.0, 0.0);
        assert_eq!(
            p.validate(),
            Err(DomainError::NonPositiveDieSize {
                what: "die width",
                value: 0.0
            })
        );
        let p = DieGridParams::new(1.0, 1.0, f64::NAN, 0.0);
        assert!(matches!(
            p.validate(),
            Err(DomainError::NonFiniteValue { .. })
        ));
    }
}
