/// Degenerate or invalid geometric input.
///
/// Every engine operation fails with this error instead of clamping or
/// defaulting bad input. The variants carry the offending values so the
/// caller can report them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{what} must be > 0 (got {value})")]
    NonPositiveCount { what: &'static str, value: u32 },
    #[error("{what} must not be 0: the boundary tangent is undefined at index 0")]
    ZeroBoundaryIndex { what: &'static str },
    #[error("{axis} range must satisfy min < max (got min={min}, max={max})")]
    InvalidIndexRange { axis: char, min: i32, max: i32 },
    #[error("wafer diameter must be > 0 (got {0})")]
    NonPositiveDiameter(f64),
    #[error("scribe width must be >= 0 (got {0})")]
    NegativeScribeWidth(f64),
    #[error("edge exclusion must be in [0, radius) (got {exclusion}, radius {radius})")]
    InvalidEdgeExclusion { exclusion: f64, radius: f64 },
    #[error("perpendicular offset {offset} lies outside a circle of radius {radius}")]
    OffsetOutsideCircle { radius: f64, offset: f64 },
    #[error("{what} must be > 0 (got {value})")]
    NonPositiveDieSize { what: &'static str, value: f64 },
    #[error("{what} must be finite (got {value})")]
    NonFiniteValue { what: &'static str, value: f64 },
    #[error("scan window of {cells} cells exceeds the limit of {limit}")]
    ScanWindowTooLarge { cells: u64, limit: u64 },
}

/// Reject NaN and infinities.
pub(crate) fn ensure_finite(what: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFiniteValue { what, value })
    }
}

pub(crate) fn ensure_positive_diameter(diameter: f64) -> Result<f64, DomainError> {
    if !diameter.is_finite() || diameter <= 0.0 {
        return Err(DomainError::NonPositiveDiameter(diameter));
    }
    Ok(diameter)
}

pub(crate) fn ensure_scribe_width(scribe_width: f64) -> Result<f64, DomainError> {
    ensure_finite("scribe width", scribe_width)?;
    if scribe_width < 0.0 {
        return Err(DomainError::NegativeScribeWidth(scribe_width));
    }
    Ok(scribe_width)
}

pub(crate) fn ensure_count(what: &'static str, value: u32) -> Result<f64, DomainError> {
    if value == 0 {
        return Err(DomainError::NonPositiveCount { what, value });
    }
    Ok(f64::from(value))
}
