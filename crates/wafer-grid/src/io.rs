//! JSON configuration and report helpers for wafer map runs.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::boundary::{BoundaryDieSolver, BoundaryModel};
use crate::classify::{ClassifiedDie, GridClassifier, WaferMap};
use crate::error::DomainError;
use crate::params::{BoundaryDieConstraints, DieGridParams, SpanDieConstraints};
use crate::span::compute_from_spans;
use crate::wafer::WaferSpec;

#[derive(thiserror::Error, Debug)]
pub enum WaferIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// How the grid parameters of a run are obtained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Derivation {
    /// Integer boundary indices with die counts; see [`BoundaryDieSolver`].
    BoundaryCounts {
        constraints: BoundaryDieConstraints,
        #[serde(default)]
        model: BoundaryModel,
    },
    /// Real-valued boundary spans with die counts; see [`compute_from_spans`].
    Spans { constraints: SpanDieConstraints },
    /// Parameters supplied directly.
    Explicit { params: DieGridParams },
}

impl Derivation {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Derivation::BoundaryCounts { .. } => "boundary_counts",
            Derivation::Spans { .. } => "spans",
            Derivation::Explicit { .. } => "explicit",
        }
    }

    /// Derive grid parameters on `wafer`.
    pub fn solve(&self, wafer: &WaferSpec) -> Result<DieGridParams, DomainError> {
        match self {
            Derivation::BoundaryCounts { constraints, model } => {
                BoundaryDieSolver::new(*model).solve(constraints, wafer.diameter)
            }
            Derivation::Spans { constraints } => {
                compute_from_spans(constraints, wafer.diameter, wafer.scribe_width)
            }
            Derivation::Explicit { params } => {
                params.validate()?;
                Ok(*params)
            }
        }
    }
}

/// A wafer plus the way its grid is derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaferMapConfig {
    #[serde(default)]
    pub wafer: WaferSpec,
    pub derivation: Derivation,
}

impl WaferMapConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, WaferIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), WaferIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Derive the grid and classify it.
    pub fn run(&self) -> Result<WaferMapReport, DomainError> {
        let params = self.derivation.solve(&self.wafer)?;
        let map = GridClassifier::new(self.wafer).classify(&params)?;
        Ok(WaferMapReport::new(
            self.wafer,
            self.derivation.strategy_name(),
            params,
            map,
        ))
    }
}

/// Result of a wafer map run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaferMapReport {
    pub wafer: WaferSpec,
    pub strategy: String,
    pub params: DieGridParams,
    pub inside_count: usize,
    pub edge_count: usize,
    pub total: usize,
    pub dies: Vec<ClassifiedDie>,
}

impl WaferMapReport {
    pub fn new(wafer: WaferSpec, strategy: &str, params: DieGridParams, map: WaferMap) -> Self {
        Self {
            wafer,
            strategy: strategy.to_owned(),
            params,
            inside_count: map.inside_count,
            edge_count: map.edge_count,
            total: map.total(),
            dies: map.dies,
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, WaferIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), WaferIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
