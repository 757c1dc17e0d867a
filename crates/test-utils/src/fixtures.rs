//! Common test fixtures for map-extract tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios in map capture and color decoding.

/// Calibration ranges for the four production metrics.
pub mod calibration {
    /// Temperature in Kelvin
    pub const TEMPERATURE: (f64, f64) = (200.0, 340.0);

    /// Precipitation in mm
    pub const PRECIPITATION: (f64, f64) = (0.0, 25.0);

    /// Relative humidity in percent
    pub const HUMIDITY: (f64, f64) = (0.0, 100.0);

    /// Enhanced vegetation index (dimensionless)
    pub const EVI: (f64, f64) = (-0.2, 1.0);
}

/// Crop region definitions for testing.
pub mod region {
    /// Production viewport crop within a 1920x1080 screenshot
    pub const VIEWPORT: (u32, u32, u32, u32) = (449, 94, 1713, 722);

    /// Viewport width after cropping
    pub const VIEWPORT_WIDTH: u32 = 1264;

    /// Viewport height after cropping
    pub const VIEWPORT_HEIGHT: u32 = 628;

    /// Small crop for fast tests
    pub const SMALL: (u32, u32, u32, u32) = (2, 2, 6, 5);
}

/// Sample view-state parameter strings.
pub mod view {
    /// A fixed reference view over the continental US
    pub const CONUS: &str = "v=-130.0,20.0,-60.0,55.0&p=geographic";

    /// A fixed reference view over Europe
    pub const EUROPE: &str = "v=-15.0,35.0,45.0,72.0&p=geographic";
}

/// Metric config YAML builders for tests that load configs from disk.
pub mod config {
    /// Renders a complete metric config document.
    pub fn metric_yaml(id: &str, layer: &str, min: f64, max: f64) -> String {
        format!(
            r#"metric:
  id: "{id}"
  name: "{id} (test)"
  enabled: true

source:
  base_url: "https://map.example.com/"
  static_parameters: "ca=true&cm=opacity"
  layers:
    - "Coastlines"
    - "{layer}"
  locale: "en"
  time: "2024-01-15-T12-00-00Z"

calibration:
  min: {min}
  max: {max}
"#
        )
    }

    /// A config document with `enabled: false`.
    pub fn disabled_metric_yaml(id: &str) -> String {
        metric_yaml(id, "TestLayer", 0.0, 1.0).replace("enabled: true", "enabled: false")
    }
}
