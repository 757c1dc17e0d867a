//! Color-to-value decoding for captured map imagery.
//!
//! Turns an RGB screenshot of a color-ramped map layer back into the
//! physical quantity the ramp encodes. The pipeline is: crop the map
//! viewport out of the full screenshot, convert each pixel's color to
//! perceptual lightness (CIE L*), linearly rescale lightness onto the
//! metric's calibration range, and reduce the resulting scalar field
//! to a no-data-aware spatial average.

pub mod aggregate;
pub mod field;
pub mod lightness;
pub mod region;

pub use aggregate::{mean_rgb, summarize, FieldSummary};
pub use field::ScalarField;
pub use region::crop_region;
