//! Crops the map viewport out of a full screenshot.

use image::{imageops, RgbImage};

use extract_common::{ExtractError, ExtractResult, PixelRect};

/// Extract `rect` from `screenshot`.
///
/// The rectangle must have positive area and lie entirely within the
/// screenshot bounds; a region that pokes past the edge is rejected
/// rather than silently clamped, since a short screenshot means the
/// page rendered at the wrong size and every decoded value would be
/// misaligned.
pub fn crop_region(screenshot: &RgbImage, rect: &PixelRect) -> ExtractResult<RgbImage> {
    if !rect.is_valid() {
        return Err(ExtractError::invalid_region(format!(
            "region {} has no area",
            rect
        )));
    }
    if rect.right > screenshot.width() || rect.bottom > screenshot.height() {
        return Err(ExtractError::invalid_region(format!(
            "region {} exceeds screenshot bounds {}x{}",
            rect,
            screenshot.width(),
            screenshot.height()
        )));
    }

    let cropped = imageops::crop_imm(screenshot, rect.left, rect.top, rect.width(), rect.height());
    Ok(cropped.to_image())
}
