//! Wafer geometry.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_positive_diameter, ensure_scribe_width, DomainError};

/// Default wafer diameter in mm.
pub const DEFAULT_WAFER_DIAMETER_MM: f64 = 300.0;

/// Default scribe (inter-die gap) width in mm.
pub const DEFAULT_SCRIBE_WIDTH_MM: f64 = 0.8;

/// Edge exclusion margin used when drawing wafer maps.
pub const DISPLAY_EDGE_EXCLUSION_MM: f64 = 7.3;

fn default_diameter() -> f64 {
    DEFAULT_WAFER_DIAMETER_MM
}

fn default_scribe_width() -> f64 {
    DEFAULT_SCRIBE_WIDTH_MM
}

/// Circular wafer with a uniform scribe gap between dies.
///
/// All lengths are in millimetres. The wafer is centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaferSpec {
    #[serde(default = "default_diameter")]
    pub diameter: f64,
    #[serde(default = "default_scribe_width")]
    pub scribe_width: f64,
    /// Margin removed from the radius before classifying dies.
    #[serde(default)]
    pub edge_exclusion: f64,
}

impl Default for WaferSpec {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_WAFER_DIAMETER_MM,
            scribe_width: DEFAULT_SCRIBE_WIDTH_MM,
            edge_exclusion: 0.0,
        }
    }
}

impl WaferSpec {
    pub fn new(diameter: f64, scribe_width: f64) -> Self {
        Self {
            diameter,
            scribe_width,
            edge_exclusion: 0.0,
        }
    }

    pub fn with_edge_exclusion(mut self, edge_exclusion: f64) -> Self {
        self.edge_exclusion = edge_exclusion;
        self
    }

    /// Apply the edge exclusion used by wafer map renderings.
    pub fn with_display_exclusion(self) -> Self {
        self.with_edge_exclusion(DISPLAY_EDGE_EXCLUSION_MM)
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Radius left after removing the edge exclusion margin.
    #[inline]
    pub fn effective_radius(&self) -> f64 {
        self.radius() - self.edge_exclusion
    }

    /// Check diameter, scribe width and edge exclusion.
    ///
    /// The edge exclusion must leave a strictly positive effective radius.
    pub fn validate(&self) -> Result<(), DomainError> {
        ensure_positive_diameter(self.diameter)?;
        ensure_scribe_width(self.scribe_width)?;
        ensure_finite("edge exclusion", self.edge_exclusion)?;
        let radius = self.radius();
        if self.edge_exclusion < 0.0 || self.edge_exclusion >= radius {
            return Err(DomainError::InvalidEdgeExclusion {
                exclusion: self.edge_exclusion,
                radius,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_300mm_wafer() {
        let w = WaferSpec::default();
        assert_eq!(w.radius(), 150.0);
        assert_eq!(w.effective_radius(), 150.0);
        assert_eq!(w.scribe_width, 0.8);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn display_exclusion_shrinks_radius() {
        let w = WaferSpec::default().with_display_exclusion();
        assert!((w.effective_radius() - 142.7).abs() < 1e-12);
        assert!(w.effective_radius() <= w.radius());
    }

    #[test]
    fn rejects_invalid_geometry() {
        assert_eq!(
            WaferSpec::new(0.0, 0.8).validate(),
            Err(DomainError::NonPositiveDiameter(0.0))
        );
        assert_eq!(
            WaferSpec::new(300.0, -0.1).validate(),
            Err(DomainError::NegativeScribeWidth(-0.1))
        );
        assert!(matches!(
            WaferSpec::default().with_edge_exclusion(-1.0).validate(),
            Err(DomainError::InvalidEdgeExclusion { .. })
        ));
        assert!(matches!(
            WaferSpec::default().with_edge_exclusion(150.0).validate(),
            Err(DomainError::InvalidEdgeExclusion { .. })
        ));
    }

    #[test]
    fn missing_json_fields_take_defaults() {
        let w: WaferSpec = serde_json::from_str(r#"{"diameter": 200.0}"#).expect("parse");
        assert_eq!(w.diameter, 200.0);
        assert_eq!(w.scribe_width, DEFAULT_SCRIBE_WIDTH_MM);
        assert_eq!(w.edge_exclusion, 0.0);
    }
}
