//! Die pitch and grid offset from integer boundary indices and die counts.
//!
//! Each axis is solved independently. For the two extreme grid lines of an
//! axis the chord of the wafer at that line is divided by the number of dies
//! observed there; the two per-side pitches are averaged. The offset then
//! places the midpoint of the two extreme indices on the wafer centre.

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::chord::{chord_length, signed_radius_at};
use crate::error::{ensure_count, ensure_positive_diameter, DomainError};
use crate::params::{BoundaryDieConstraints, DieGridParams};
use crate::round::{round_half_up, BOUNDARY_PRECISION};

/// Where the extreme row or column is assumed to cut the wafer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryModel {
    /// The extreme line sits on the wafer's cardinal tangent point
    /// (perpendicular offset `±radius`).
    #[default]
    CardinalTangent,
    /// The extreme line sits at `index·pitch` from the centre, and its chord
    /// holds exactly `count` pitches: `count·p = 2·√(r² − (index·p)²)`,
    /// solved in closed form as `p = 2r / √(count² + 4·index²)`.
    ExactChord,
}

/// Boundary-count solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryDieSolver {
    #[serde(default)]
    pub model: BoundaryModel,
}

/// Observations for one axis.
#[derive(Clone, Copy, Debug)]
struct AxisBoundary {
    axis: char,
    min_index: i32,
    max_index: i32,
    count_at_min: u32,
    count_at_max: u32,
}

impl BoundaryDieSolver {
    pub fn new(model: BoundaryModel) -> Self {
        Self { model }
    }

    /// Derive die size and offset, rounded to [`BOUNDARY_PRECISION`] decimals.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, constraints), fields(model = ?self.model))
    )]
    pub fn solve(
        &self,
        constraints: &BoundaryDieConstraints,
        wafer_diameter: f64,
    ) -> Result<DieGridParams, DomainError> {
        let radius = ensure_positive_diameter(wafer_diameter)? / 2.0;

        let x_axis = AxisBoundary {
            axis: 'x',
            min_index: constraints.diex_min,
            max_index: constraints.diex_max,
            count_at_min: constraints.die_count_at_xmin,
            count_at_max: constraints.die_count_at_xmax,
        };
        let y_axis = AxisBoundary {
            axis: 'y',
            min_index: constraints.diey_min,
            max_index: constraints.diey_max,
            count_at_min: constraints.die_count_at_ymin,
            count_at_max: constraints.die_count_at_ymax,
        };

        let (die_width, offset_x) = self.solve_axis(radius, &x_axis)?;
        let (die_height, offset_y) = self.solve_axis(radius, &y_axis)?;

        let params = DieGridParams {
            die_width: round_half_up(die_width, BOUNDARY_PRECISION),
            die_height: round_half_up(die_height, BOUNDARY_PRECISION),
            offset_x: round_half_up(offset_x, BOUNDARY_PRECISION),
            offset_y: round_half_up(offset_y, BOUNDARY_PRECISION),
        };
        log::debug!(
            "boundary solve ({:?}): die {}x{} mm, offset ({}, {}) mm",
            self.model,
            params.die_width,
            params.die_height,
            params.offset_x,
            params.offset_y
        );
        Ok(params)
    }

    fn solve_axis(&self, radius: f64, obs: &AxisBoundary) -> Result<(f64, f64), DomainError> {
        let (min_what, max_what, min_count_what, max_count_what) = match obs.axis {
            'x' => ("diex_min", "diex_max", "die_count_at_xmin", "die_count_at_xmax"),
            _ => ("diey_min", "diey_max", "die_count_at_ymin", "die_count_at_ymax"),
        };
        if obs.min_index == 0 {
            return Err(DomainError::ZeroBoundaryIndex { what: min_what });
        }
        if obs.max_index == 0 {
            return Err(DomainError::ZeroBoundaryIndex { what: max_what });
        }
        if obs.min_index >= obs.max_index {
            return Err(DomainError::InvalidIndexRange {
                axis: obs.axis,
                min: obs.min_index,
                max: obs.max_index,
            });
        }
        let count_at_min = ensure_count(min_count_what, obs.count_at_min)?;
        let count_at_max = ensure_count(max_count_what, obs.count_at_max)?;

        let pitch_at_min = self.side_pitch(radius, obs.min_index, count_at_min)?;
        let pitch_at_max = self.side_pitch(radius, obs.max_index, count_at_max)?;
        let pitch = (pitch_at_min + pitch_at_max) / 2.0;

        let index_sum = f64::from(obs.min_index) + f64::from(obs.max_index);
        let offset = -(index_sum * pitch) / 2.0;
        Ok((pitch, offset))
    }

    fn side_pitch(&self, radius: f64, index: i32, count: f64) -> Result<f64, DomainError> {
        match self.model {
            BoundaryModel::CardinalTangent => {
                let chord = chord_length(radius, signed_radius_at(radius, index)?)?;
                Ok(chord / count)
            }
            BoundaryModel::ExactChord => {
                let index = f64::from(index);
                Ok(2.0 * radius / (count * count + 4.0 * index * index).sqrt())
            }
        }
    }
}

/// Derive grid parameters from boundary indices using the default
/// [`BoundaryModel::CardinalTangent`] model.
pub fn compute_from_boundary_counts(
    constraints: &BoundaryDieConstraints,
    wafer_diameter: f64,
) -> Result<DieGridParams, DomainError> {
    BoundaryDieSolver::default().solve(constraints, wafer_diameter)
}
