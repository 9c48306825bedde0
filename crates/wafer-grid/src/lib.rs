//! Die grid derivation and classification on circular wafers.
//!
//! The crate is purely geometric and synchronous. It answers two questions:
//!
//! 1. Given sparse observations of the wafer boundary (how many dies sit in
//!    the extreme rows and columns), what are the die pitch and the grid
//!    offset? Two independent strategies are provided:
//!    [`compute_from_boundary_counts`] (chord based, integer indices) and
//!    [`compute_from_spans`] (distance proportion, real-valued spans).
//! 2. Given a grid, which cells are `Inside` the wafer and which cross its
//!    `Edge`? See [`classify_grid`] and [`GridClassifier`].
//!
//! All lengths are millimetres; the wafer centre is the origin.
//!
//! ## Quickstart
//!
//! ```
//! use wafer_grid::{classify_grid, compute_from_spans, DieStatus, SpanDieConstraints};
//!
//! # fn main() -> Result<(), wafer_grid::DomainError> {
//! let spans = SpanDieConstraints {
//!     xmin: -7.0,
//!     xmax: 7.0,
//!     ymin: -13.0,
//!     ymax: 11.0,
//!     xmin_count: 6,
//!     xmax_count: 11,
//!     ymin_count: 4,
//!     ymax_count: 5,
//! };
//! let params = compute_from_spans(&spans, 300.0, 0.8)?;
//! assert_eq!(params.die_width, 18.75);
//!
//! let dies = classify_grid(&params, 300.0, 0.8, 0.0)?;
//! assert!(dies.iter().any(|d| d.status == DieStatus::Inside));
//! # Ok(())
//! # }
//! ```
//!
//! ## Output precision
//!
//! Derived parameters are rounded to [`BOUNDARY_PRECISION`] decimals with
//! ties towards positive infinity (boundary counts), or to [`SPAN_PRECISION`]
//! decimals with ties away from zero (spans). The precision is part of
//! the output: identical inputs always give bit-identical parameters.

mod boundary;
mod chord;
mod classify;
mod error;
mod io;
mod logger;
mod params;
mod round;
mod span;
mod wafer;

pub use boundary::{compute_from_boundary_counts, BoundaryDieSolver, BoundaryModel};
pub use chord::{chord_length, signed_radius_at};
pub use classify::{
    classify_die, classify_grid, ClassifiedDie, DieStatus, GridClassifier, ScanWindow, WaferMap,
    DEFAULT_MAX_SCAN_CELLS,
};
pub use error::DomainError;
pub use io::{Derivation, WaferIoError, WaferMapConfig, WaferMapReport};
pub use params::{BoundaryDieConstraints, DieGridParams, SpanDieConstraints};
pub use round::{
    round_half_away_from_zero, round_half_up, BOUNDARY_PRECISION, SPAN_PRECISION,
};
pub use span::compute_from_spans;
pub use wafer::{
    WaferSpec, DEFAULT_SCRIBE_WIDTH_MM, DEFAULT_WAFER_DIAMETER_MM, DISPLAY_EDGE_EXCLUSION_MM,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_logger, init_with_level, LogFormat};
