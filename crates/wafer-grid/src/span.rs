//! Die size and grid offset from real-valued boundary spans.
//!
//! A distance-proportion heuristic: the die size is the wafer diameter
//! spread over `span + 2` dies, and the offset shifts the grid towards the
//! side with more observed dies, weighting each side's distance from the
//! centre by the opposite side's count. Independent from
//! [`BoundaryDieSolver`](crate::BoundaryDieSolver); the two need not agree.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::{
    ensure_count, ensure_finite, ensure_positive_diameter, ensure_scribe_width, DomainError,
};
use crate::params::{DieGridParams, SpanDieConstraints};
use crate::round::{round_half_away_from_zero, SPAN_PRECISION};

/// Per-axis result before rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AxisSolution {
    size: f64,
    offset: f64,
}

fn solve_axis(
    what: &'static str,
    diameter: f64,
    scribe_width: f64,
    min_pos: f64,
    max_pos: f64,
    min_count: f64,
    max_count: f64,
) -> Result<AxisSolution, DomainError> {
    let span = max_pos - min_pos;
    let size = diameter / (span + 2.0);
    if !size.is_finite() || size <= 0.0 {
        return Err(DomainError::NonPositiveDieSize { what, value: size });
    }

    let pitch = size + scribe_width;
    let min_dist = (min_pos * pitch).abs();
    let max_dist = (max_pos * pitch).abs();
    let offset = (max_dist * min_count - min_dist * max_count) / (min_count + max_count);

    Ok(AxisSolution { size, offset })
}

/// Derive grid parameters from boundary spans, rounded to
/// [`SPAN_PRECISION`] decimals with ties away from zero.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(constraints))
)]
pub fn compute_from_spans(
    constraints: &SpanDieConstraints,
    diameter: f64,
    scribe_width: f64,
) -> Result<DieGridParams, DomainError> {
    let diameter = ensure_positive_diameter(diameter)?;
    let scribe_width = ensure_scribe_width(scribe_width)?;
    let xmin = ensure_finite("xmin", constraints.xmin)?;
    let xmax = ensure_finite("xmax", constraints.xmax)?;
    let ymin = ensure_finite("ymin", constraints.ymin)?;
    let ymax = ensure_finite("ymax", constraints.ymax)?;
    let xmin_count = ensure_count("xmin_count", constraints.xmin_count)?;
    let xmax_count = ensure_count("xmax_count", constraints.xmax_count)?;
    let ymin_count = ensure_count("ymin_count", constraints.ymin_count)?;
    let ymax_count = ensure_count("ymax_count", constraints.ymax_count)?;

    let x = solve_axis(
        "die width",
        diameter,
        scribe_width,
        xmin,
        xmax,
        xmin_count,
        xmax_count,
    )?;
    let y = solve_axis(
        "die height",
        diameter,
        scribe_width,
        ymin,
        ymax,
        ymin_count,
        ymax_count,
    )?;

    let params = DieGridParams {
        die_width: round_half_away_from_zero(x.size, SPAN_PRECISION),
        die_height: round_half_away_from_zero(y.size, SPAN_PRECISION),
        offset_x: round_half_away_from_zero(x.offset, SPAN_PRECISION),
        offset_y: round_half_away_from_zero(y.offset, SPAN_PRECISION),
    };
    log::debug!(
        "span solve: die {}x{} mm, offset ({}, {}) mm",
        params.die_width,
        params.die_height,
        params.offset_x,
        params.offset_y
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> SpanDieConstraints {
        SpanDieConstraints {
            xmin: -7.0,
            xmax: 7.0,
            ymin: -13.0,
            ymax: 11.0,
            xmin_count: 6,
            xmax_count: 11,
            ymin_count: 4,
            ymax_count: 5,
        }
    }

    #[test]
    fn size_spreads_diameter_over_span() {
        let p = compute_from_spans(&example(), 300.0, 0.8).expect("solve");
        assert_eq!(p.die_width, 18.75);
        // 300 / 26 = 11.53846...
        assert_eq!(p.die_height, 11.538);
    }

    #[test]
    fn offset_weights_distances_by_opposite_count() {
        let p = compute_from_spans(&example(), 300.0, 0.8).expect("solve");
        // x: both sides at 7 · 19.55 = 136.85 => 136.85 · (6 − 11) / 17
        assert_eq!(p.offset_x, -40.25);
        // y: pitch = 300/26 + 0.8, (11·4 − 13·5)·pitch / 9
        let pitch = 300.0 / 26.0 + 0.8;
        let expected = (11.0 * pitch * 4.0 - 13.0 * pitch * 5.0) / 9.0;
        assert_eq!(p.offset_y, round_half_away_from_zero(expected, 3));
    }

    #[test]
    fn negative_tie_offset_rounds_away_from_zero() {
        let c = SpanDieConstraints {
            xmin: -20.0,
            xmax: 2.0,
            xmin_count: 5,
            xmax_count: 11,
            ..example()
        };
        let p = compute_from_spans(&c, 300.0, 0.8).expect("solve");
        // size 12.5, pitch 13.3: (26.6·5 − 266·11) / 16 = −174.5625 exactly
        assert_eq!(p.die_width, 12.5);
        assert_eq!(p.offset_x, -174.563);
    }

    #[test]
    fn equal_counts_on_symmetric_span_centre_the_grid() {
        let c = SpanDieConstraints {
            xmin: -5.0,
            xmax: 5.0,
            ymin: -5.0,
            ymax: 5.0,
            xmin_count: 3,
            xmax_count: 3,
            ymin_count: 9,
            ymax_count: 9,
        };
        let p = compute_from_spans(&c, 300.0, 0.8).expect("solve");
        assert_eq!(p.offset_x, 0.0);
        assert_eq!(p.offset_y, 0.0);
        assert_eq!(p.die_width, 25.0);
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut c = example();
        c.xmin_count = 0;
        assert_eq!(
            compute_from_spans(&c, 300.0, 0.8),
            Err(DomainError::NonPositiveCount {
                what: "xmin_count",
                value: 0
            })
        );
    }

    #[test]
    fn span_at_or_below_minus_two_is_rejected() {
        let mut c = example();
        c.xmin = 3.0;
        c.xmax = 1.0;
        assert!(matches!(
            compute_from_spans(&c, 300.0, 0.8),
            Err(DomainError::NonPositiveDieSize {
                what: "die width",
                ..
            })
        ));
        c.xmin = 1.0;
        c.xmax = -3.0;
        assert!(matches!(
            compute_from_spans(&c, 300.0, 0.8),
            Err(DomainError::NonPositiveDieSize { .. })
        ));
    }

    #[test]
    fn invalid_wafer_is_rejected() {
        assert_eq!(
            compute_from_spans(&example(), 0.0, 0.8),
            Err(DomainError::NonPositiveDiameter(0.0))
        );
        assert_eq!(
            compute_from_spans(&example(), 300.0, -1.0),
            Err(DomainError::NegativeScribeWidth(-1.0))
        );
    }
}
