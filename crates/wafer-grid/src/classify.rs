//! Die classification against the wafer boundary.
//!
//! Every grid cell in a window covering the whole wafer is tested by its
//! four corners: all corners within the effective radius makes the die
//! `Inside`, one to three makes it `Edge`, none makes it `Outside`. The
//! boundary is closed, so a corner exactly on the circle counts as inside.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::DomainError;
use crate::params::{BoundaryDieConstraints, DieGridParams};
use crate::wafer::WaferSpec;

/// Upper bound on the number of cells a single scan may visit.
pub const DEFAULT_MAX_SCAN_CELLS: u64 = 1 << 24;

/// Cells added on each side of the wafer-sized window.
const SCAN_MARGIN: f64 = 2.0;

/// Position of a die relative to the wafer boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieStatus {
    Inside,
    Edge,
    Outside,
}

impl DieStatus {
    /// Map the number of corners within the boundary (0..=4) to a status.
    pub fn from_corners_inside(corners_inside: usize) -> Self {
        match corners_inside {
            4 => DieStatus::Inside,
            0 => DieStatus::Outside,
            _ => DieStatus::Edge,
        }
    }
}

/// A die on the wafer (status is never `Outside`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDie {
    pub x: i32,
    pub y: i32,
    pub status: DieStatus,
}

impl ClassifiedDie {
    /// Centre of this die in wafer coordinates (mm).
    pub fn center(&self, params: &DieGridParams, scribe_width: f64) -> Point2<f64> {
        params.die_center(self.x, self.y, scribe_width)
    }
}

/// Half-extent of the scanned index window: `x ∈ [−nx, nx]`, `y ∈ [−ny, ny]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWindow {
    pub nx: i32,
    pub ny: i32,
}

impl ScanWindow {
    /// Number of cells the window covers.
    pub fn cells(&self) -> u64 {
        let w = 2 * u64::from(self.nx.unsigned_abs()) + 1;
        let h = 2 * u64::from(self.ny.unsigned_abs()) + 1;
        w * h
    }
}

/// Classified dies of one wafer, in scan order (by `x`, then `y`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaferMap {
    pub dies: Vec<ClassifiedDie>,
    pub inside_count: usize,
    pub edge_count: usize,
}

impl WaferMap {
    fn push(&mut self, die: ClassifiedDie) {
        match die.status {
            DieStatus::Inside => self.inside_count += 1,
            DieStatus::Edge => self.edge_count += 1,
            DieStatus::Outside => return,
        }
        self.dies.push(die);
    }

    /// Number of dies touching the usable area.
    #[inline]
    pub fn total(&self) -> usize {
        self.dies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedDie> {
        self.dies.iter()
    }
}

/// Classifies grid cells of a [`DieGridParams`] grid on one wafer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridClassifier {
    pub wafer: WaferSpec,
    #[serde(default = "default_max_scan_cells")]
    pub max_scan_cells: u64,
}

fn default_max_scan_cells() -> u64 {
    DEFAULT_MAX_SCAN_CELLS
}

impl GridClassifier {
    pub fn new(wafer: WaferSpec) -> Self {
        Self {
            wafer,
            max_scan_cells: DEFAULT_MAX_SCAN_CELLS,
        }
    }

    pub fn with_max_scan_cells(mut self, max_scan_cells: u64) -> Self {
        self.max_scan_cells = max_scan_cells;
        self
    }

    /// Index window covering the wafer plus a two-cell margin per side.
    pub fn scan_window(&self, params: &DieGridParams) -> Result<ScanWindow, DomainError> {
        self.wafer.validate()?;
        params.validate()?;

        let nx = (self.wafer.diameter / params.die_width).ceil() + SCAN_MARGIN;
        let ny = (self.wafer.diameter / params.die_height).ceil() + SCAN_MARGIN;
        let cells = (2.0 * nx + 1.0) * (2.0 * ny + 1.0);
        if !cells.is_finite() || cells > self.max_scan_cells as f64 {
            return Err(DomainError::ScanWindowTooLarge {
                cells: if cells.is_finite() { cells as u64 } else { u64::MAX },
                limit: self.max_scan_cells,
            });
        }
        Ok(ScanWindow {
            nx: nx as i32,
            ny: ny as i32,
        })
    }

    /// Number of corners of die `(x, y)` within the effective radius.
    pub fn corners_inside(&self, params: &DieGridParams, x: i32, y: i32) -> usize {
        let limit = self.wafer.effective_radius();
        params
            .die_corners(x, y, self.wafer.scribe_width)
            .iter()
            .filter(|corner| corner.coords.norm() <= limit)
            .count()
    }

    /// Classify a single grid cell, `Outside` included.
    pub fn classify_die(
        &self,
        params: &DieGridParams,
        x: i32,
        y: i32,
    ) -> Result<DieStatus, DomainError> {
        self.wafer.validate()?;
        params.validate()?;
        Ok(DieStatus::from_corners_inside(
            self.corners_inside(params, x, y),
        ))
    }

    /// Classify every cell of the scan window, dropping `Outside` cells.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, params), fields(diameter = self.wafer.diameter))
    )]
    pub fn classify(&self, params: &DieGridParams) -> Result<WaferMap, DomainError> {
        let window = self.scan_window(params)?;
        log::debug!(
            "scanning {} cells (nx={}, ny={}), effective radius {} mm",
            window.cells(),
            window.nx,
            window.ny,
            self.wafer.effective_radius()
        );

        let mut map = WaferMap::default();
        for x in -window.nx..=window.nx {
            for y in -window.ny..=window.ny {
                let status = DieStatus::from_corners_inside(self.corners_inside(params, x, y));
                map.push(ClassifiedDie { x, y, status });
            }
        }

        log::debug!(
            "classified {} dies ({} inside, {} edge)",
            map.total(),
            map.inside_count,
            map.edge_count
        );
        Ok(map)
    }

    /// Dies of the observed index range, widened by one cell per side, whose
    /// four corners all lie within the full wafer radius.
    ///
    /// This is the die listing produced from boundary-index observations:
    /// cells span `[x·w + offset_x, (x+1)·w + offset_x]` with no scribe
    /// street, edge exclusion is ignored, and only `Inside` dies are kept.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, constraints, params))
    )]
    pub fn fully_inside_in_range(
        &self,
        constraints: &BoundaryDieConstraints,
        params: &DieGridParams,
    ) -> Result<WaferMap, DomainError> {
        self.wafer.validate()?;
        params.validate()?;
        let (x0, x1) = widened_range('x', constraints.diex_min, constraints.diex_max)?;
        let (y0, y1) = widened_range('y', constraints.diey_min, constraints.diey_max)?;

        let cells = (i64::from(x1) - i64::from(x0) + 1) as u64
            * (i64::from(y1) - i64::from(y0) + 1) as u64;
        if cells > self.max_scan_cells {
            return Err(DomainError::ScanWindowTooLarge {
                cells,
                limit: self.max_scan_cells,
            });
        }

        let radius = self.wafer.radius();
        let mut map = WaferMap::default();
        for x in x0..=x1 {
            for y in y0..=y1 {
                let left = f64::from(x) * params.die_width + params.offset_x;
                let bottom = f64::from(y) * params.die_height + params.offset_y;
                let right = left + params.die_width;
                let top = bottom + params.die_height;
                let inside = [
                    Point2::new(left, bottom),
                    Point2::new(right, bottom),
                    Point2::new(left, top),
                    Point2::new(right, top),
                ]
                .iter()
                .all(|corner| corner.coords.norm() <= radius);
                if inside {
                    map.push(ClassifiedDie {
                        x,
                        y,
                        status: DieStatus::Inside,
                    });
                }
            }
        }

        log::debug!(
            "{} of {} cells in x {}..={}, y {}..={} fully inside r = {} mm",
            map.total(),
            cells,
            x0,
            x1,
            y0,
            y1,
            radius
        );
        Ok(map)
    }
}

fn widened_range(axis: char, min: i32, max: i32) -> Result<(i32, i32), DomainError> {
    if min >= max {
        return Err(DomainError::InvalidIndexRange { axis, min, max });
    }
    Ok((min.saturating_sub(1), max.saturating_add(1)))
}

/// Classify the grid on a wafer of `diameter` with the given scribe width
/// and edge exclusion. `Outside` cells are omitted.
pub fn classify_grid(
    params: &DieGridParams,
    diameter: f64,
    scribe_width: f64,
    edge_exclusion: f64,
) -> Result<Vec<ClassifiedDie>, DomainError> {
    let wafer = WaferSpec::new(diameter, scribe_width).with_edge_exclusion(edge_exclusion);
    Ok(GridClassifier::new(wafer).classify(params)?.dies)
}

/// Classify die `(x, y)` on `wafer`.
pub fn classify_die(
    params: &DieGridParams,
    wafer: &WaferSpec,
    x: i32,
    y: i32,
) -> Result<DieStatus, DomainError> {
    GridClassifier::new(*wafer).classify_die(params, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_corner_count() {
        assert_eq!(DieStatus::from_corners_inside(4), DieStatus::Inside);
        for n in 1..=3 {
            assert_eq!(DieStatus::from_corners_inside(n), DieStatus::Edge);
        }
        assert_eq!(DieStatus::from_corners_inside(0), DieStatus::Outside);
    }

    #[test]
    fn window_covers_wafer_with_margin() {
        let c = GridClassifier::new(WaferSpec::default());
        let w = c
            .scan_window(&DieGridParams::new(17.0, 10.0, 5.0, 8.5))
            .expect("window");
        // ceil(300 / 17) = 18, ceil(300 / 10) = 30
        assert_eq!(w, ScanWindow { nx: 20, ny: 32 });
        assert_eq!(w.cells(), 41 * 65);
    }

    #[test]
    fn corner_on_boundary_counts_as_inside() {
        // 6-8-10 triangle: die corner at (6, 8) lies exactly on r = 10.
        let wafer = WaferSpec::new(20.0, 0.0);
        let params = DieGridParams::new(2.0, 2.0, -5.0, -7.0);
        let c = GridClassifier::new(wafer);
        assert_eq!(c.corners_inside(&params, 0, 0), 4);
        assert_eq!(
            c.classify_die(&params, 0, 0).expect("classify"),
            DieStatus::Inside
        );
    }

    #[test]
    fn centre_die_on_large_wafer_is_inside() {
        let params = DieGridParams::new(10.0, 10.0, 0.0, 0.0);
        let dies = classify_grid(&params, 300.0, 0.8, 0.0).expect("classify");
        let centre = dies
            .iter()
            .find(|d| d.x == 0 && d.y == 0)
            .expect("centre die");
        assert_eq!(centre.status, DieStatus::Inside);
        assert!(dies.iter().all(|d| d.status != DieStatus::Outside));
    }

    #[test]
    fn scan_order_is_x_major() {
        let params = DieGridParams::new(20.0, 20.0, 0.0, 0.0);
        let dies = classify_grid(&params, 100.0, 0.0, 0.0).expect("classify");
        let keys: Vec<(i32, i32)> = dies.iter().map(|d| (d.x, d.y)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn edge_exclusion_only_removes_or_demotes_dies() {
        let params = DieGridParams::new(12.0, 9.0, 3.0, -2.0);
        let full = GridClassifier::new(WaferSpec::default())
            .classify(&params)
            .expect("full");
        let shrunk = GridClassifier::new(WaferSpec::default().with_display_exclusion())
            .classify(&params)
            .expect("shrunk");
        assert!(shrunk.total() <= full.total());
        assert!(shrunk.inside_count <= full.inside_count);
        for die in shrunk.iter() {
            let before = full
                .iter()
                .find(|d| d.x == die.x && d.y == die.y)
                .expect("die present without exclusion");
            if die.status == DieStatus::Inside {
                assert_eq!(before.status, DieStatus::Inside);
            }
        }
    }

    #[test]
    fn counts_match_dies() {
        let params = DieGridParams::new(17.0, 10.0, 5.0, 8.5);
        let map = GridClassifier::new(WaferSpec::default().with_display_exclusion())
            .classify(&params)
            .expect("classify");
        assert_eq!(map.inside_count + map.edge_count, map.total());
        assert!(map.inside_count > 0 && map.edge_count > 0);
    }

    #[test]
    fn degenerate_die_size_is_rejected() {
        let params = DieGridParams::new(0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            classify_grid(&params, 300.0, 0.8, 0.0),
            Err(DomainError::NonPositiveDieSize { .. })
        ));
    }

    fn observed_range() -> BoundaryDieConstraints {
        BoundaryDieConstraints {
            diex_min: -3,
            diex_max: 2,
            diey_min: -3,
            diey_max: 2,
            die_count_at_xmin: 4,
            die_count_at_xmax: 4,
            die_count_at_ymin: 4,
            die_count_at_ymax: 4,
        }
    }

    #[test]
    fn range_listing_keeps_fully_inside_dies() {
        // Cells of 10 mm on r = 50, scanned over -4..=3 on both axes.
        let c = GridClassifier::new(WaferSpec::new(100.0, 0.8));
        let params = DieGridParams::new(10.0, 10.0, 0.0, 0.0);
        let map = c
            .fully_inside_in_range(&observed_range(), &params)
            .expect("listing");
        assert_eq!(map.total(), 60);
        assert_eq!(map.inside_count, 60);
        assert_eq!(map.edge_count, 0);
        for corner in [(-4, -4), (-4, 3), (3, -4), (3, 3)] {
            assert!(!map.iter().any(|d| (d.x, d.y) == corner), "{corner:?}");
        }
        // Far corner (40, 30) sits exactly on the circle.
        assert!(map.iter().any(|d| (d.x, d.y) == (3, 2)));
        assert_eq!(map.dies.first().map(|d| (d.x, d.y)), Some((-4, -3)));
        assert_eq!(map.dies.last().map(|d| (d.x, d.y)), Some((3, 2)));
    }

    #[test]
    fn range_listing_ignores_scribe_and_exclusion() {
        let params = DieGridParams::new(10.0, 10.0, 0.0, 0.0);
        let plain = GridClassifier::new(WaferSpec::new(100.0, 0.0))
            .fully_inside_in_range(&observed_range(), &params)
            .expect("plain");
        let wafer = WaferSpec::new(100.0, 5.0).with_edge_exclusion(20.0);
        let wide = GridClassifier::new(wafer)
            .fully_inside_in_range(&observed_range(), &params)
            .expect("wide");
        assert_eq!(plain, wide);
    }

    #[test]
    fn range_listing_rejects_inverted_range() {
        let mut c = observed_range();
        c.diey_min = 2;
        assert_eq!(
            GridClassifier::new(WaferSpec::new(100.0, 0.0))
                .fully_inside_in_range(&c, &DieGridParams::new(10.0, 10.0, 0.0, 0.0)),
            Err(DomainError::InvalidIndexRange {
                axis: 'y',
                min: 2,
                max: 2
            })
        );
    }

    #[test]
    fn oversized_window_is_rejected() {
        let params = DieGridParams::new(0.001, 0.001, 0.0, 0.0);
        assert!(matches!(
            classify_grid(&params, 300.0, 0.0, 0.0),
            Err(DomainError::ScanWindowTooLarge { .. })
        ));
        let small_cap = GridClassifier::new(WaferSpec::default()).with_max_scan_cells(100);
        assert!(small_cap
            .classify(&DieGridParams::new(10.0, 10.0, 0.0, 0.0))
            .is_err());
    }
}
