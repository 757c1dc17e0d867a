//! sRGB to CIE L* lightness conversion.
//!
//! Implements the standard sRGB (D65) path: per-channel inverse gamma,
//! relative luminance Y from the Rec. 709 primaries, then the CIE
//! lightness transfer function. Only the L* component of L*a*b* is
//! needed here; chroma never influences the decoded value.

/// CIE threshold below which the lightness curve is linear (216/24389).
const EPSILON: f64 = 216.0 / 24389.0;

/// Slope of the linear segment of the lightness curve (24389/27).
const KAPPA: f64 = 24389.0 / 27.0;

/// sRGB luminance weights for linear R, G, B.
const LUMA_R: f64 = 0.2126729;
const LUMA_G: f64 = 0.7151522;
const LUMA_B: f64 = 0.0721750;

/// Undo the sRGB transfer function for one channel in [0, 1].
#[inline]
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an 8-bit sRGB pixel, in [0, 1].
#[inline]
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    let rl = srgb_to_linear(r as f64 / 255.0);
    let gl = srgb_to_linear(g as f64 / 255.0);
    let bl = srgb_to_linear(b as f64 / 255.0);
    LUMA_R * rl + LUMA_G * gl + LUMA_B * bl
}

/// CIE L* of an 8-bit sRGB pixel, in [0, 100].
#[inline]
pub fn cie_lightness(r: u8, g: u8, b: u8) -> f64 {
    let y = relative_luminance(r, g, b);
    if y > EPSILON {
        116.0 * y.cbrt() - 16.0
    } else {
        KAPPA * y
    }
}

/// Normalized lightness in [0, 1], clamped.
///
/// The luminance weights sum to slightly above 1.0, so pure white lands
/// a hair over 100 before clamping; the clamp keeps decoded values
/// inside the calibration range at both ends.
#[inline]
pub fn normalized_lightness(r: u8, g: u8, b: u8) -> f64 {
    (cie_lightness(r, g, b) / 100.0).clamp(0.0, 1.0)
}
