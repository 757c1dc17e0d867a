//! Metric identity, calibration, and view-state types.

use serde::{Deserialize, Serialize};

/// Unique identifier for an environmental metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricId(pub String);

impl MetricId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque caller-supplied parameters identifying the map's displayed
/// extent and time (pan/zoom/time state). Request-scoped and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState(pub String);

impl ViewState {
    pub fn new(params: impl Into<String>) -> Self {
        Self(params.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical bounds a metric's color ramp encodes.
///
/// Lightness 0.0 maps to `min`, lightness 1.0 maps to `max`; the decoded
/// value for any lightness in between is a direct linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRange {
    pub min: f64,
    pub max: f64,
}

impl CalibrationRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Physical span covered by the ramp.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Map a normalized lightness in [0, 1] to a physical value.
    pub fn value_for(&self, lightness: f64) -> f64 {
        self.min + lightness * self.span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_endpoints() {
        let range = CalibrationRange::new(200.0, 340.0);
        assert_eq!(range.value_for(0.0), 200.0);
        assert_eq!(range.value_for(1.0), 340.0);
        assert_eq!(range.span(), 140.0);
    }

    #[test]
    fn test_calibration_negative_min() {
        // EVI ramp spans -0.2 to 1.0
        let range = CalibrationRange::new(-0.2, 1.0);
        assert!((range.value_for(0.5) - 0.4).abs() < 1e-9);
    }
}
