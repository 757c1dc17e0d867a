//! Map capture collaborator.
//!
//! Everything downstream of capture is pure pixel math; this crate owns
//! the one genuinely external step, rendering the remote map page in a
//! real browser and handing back the raster. The `MapCapture` trait is
//! the seam: the production implementation drives a WebDriver endpoint,
//! tests substitute synthetic rasters.

pub mod webdriver;

pub use webdriver::{WebDriverCapture, WebDriverConfig};

use async_trait::async_trait;
use image::RgbImage;

use extract_common::ExtractResult;

/// Captures a rendered map page as an RGB raster.
#[async_trait]
pub trait MapCapture: Send + Sync {
    /// Navigate to `url`, wait for the element with DOM id `element_id`
    /// to become visible, let the tiles settle, and return a screenshot
    /// of that element.
    ///
    /// Implementations must bound the wait; a page that never shows the
    /// element surfaces as a capture error, not a hang.
    async fn capture(&self, url: &str, element_id: &str) -> ExtractResult<RgbImage>;
}
