//! Pixel-space crop region.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screenshot pixel coordinates.
///
/// `left`/`top` are inclusive, `right`/`bottom` are exclusive, matching
/// half-open image slicing. The region is only meaningful against a
/// screenshot at least `right` x `bottom` pixels in size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// True when the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }
}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let rect = PixelRect::new(449, 94, 1713, 722);
        assert_eq!(rect.width(), 1264);
        assert_eq!(rect.height(), 628);
        assert!(rect.is_valid());
    }

    #[test]
    fn test_degenerate_rect() {
        let rect = PixelRect::new(100, 100, 100, 200);
        assert_eq!(rect.width(), 0);
        assert!(!rect.is_valid());

        let inverted = PixelRect::new(200, 50, 100, 40);
        assert_eq!(inverted.width(), 0);
        assert_eq!(inverted.height(), 0);
        assert!(!inverted.is_valid());
    }

    #[test]
    fn test_display() {
        let rect = PixelRect::new(449, 94, 1713, 722);
        assert_eq!(rect.to_string(), "(449,94)-(1713,722)");
    }
}
