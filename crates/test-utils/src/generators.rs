//! Generators for synthetic map screenshots.
//!
//! These generators create predictable, verifiable test images that can
//! be used across the test suite without real browser captures.

use image::{ImageFormat, Rgb, RgbImage};

/// Creates an image filled with a single color.
///
/// # Example
///
/// ```
/// use test_utils::solid_image;
///
/// let img = solid_image(4, 2, [255, 255, 255]);
/// assert_eq!(img.dimensions(), (4, 2));
/// ```
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Creates an image from explicit row-major pixel colors.
///
/// Panics if `pixels.len() != width * height`.
///
/// # Example
///
/// ```
/// use test_utils::image_from_pixels;
///
/// let img = image_from_pixels(2, 1, &[[0, 0, 0], [255, 255, 255]]);
/// assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255]);
/// ```
pub fn image_from_pixels(width: u32, height: u32, pixels: &[[u8; 3]]) -> RgbImage {
    assert_eq!(
        pixels.len(),
        (width as usize) * (height as usize),
        "pixel count does not match image dimensions"
    );
    RgbImage::from_fn(width, height, |x, y| {
        Rgb(pixels[(y as usize) * (width as usize) + (x as usize)])
    })
}

/// Creates a screenshot-sized image with one rectangle painted `fill`
/// and everything outside painted `background`.
///
/// The rectangle is half-open: `(left, top)` inclusive, `(right, bottom)`
/// exclusive. Useful for verifying that cropping picks up exactly the
/// viewport region.
pub fn screenshot_with_region(
    width: u32,
    height: u32,
    region: (u32, u32, u32, u32),
    fill: [u8; 3],
    background: [u8; 3],
) -> RgbImage {
    let (left, top, right, bottom) = region;
    RgbImage::from_fn(width, height, |x, y| {
        if x >= left && x < right && y >= top && y < bottom {
            Rgb(fill)
        } else {
            Rgb(background)
        }
    })
}

/// Encodes an image as PNG bytes, the format browser captures arrive in.
pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .expect("PNG encoding of test image failed");
    buf.into_inner()
}
