//! Decoded scalar field backing a cropped map image.

use image::RgbImage;
use rayon::prelude::*;

use extract_common::CalibrationRange;

use crate::lightness::normalized_lightness;

/// Physical values decoded from a cropped map image, row-major.
///
/// Pure black pixels are the renderer's no-data sentinel and decode to
/// NaN; every other pixel decodes to a value inside the calibration
/// range.
#[derive(Debug, Clone)]
pub struct ScalarField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl ScalarField {
    /// Build a field from raw values. `values` must contain exactly
    /// `width * height` entries.
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            (width as usize) * (height as usize),
            "value count does not match field dimensions"
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// Decode every pixel of `image` onto `calibration`.
    ///
    /// Rows are independent, so they are decoded in parallel.
    pub fn decode(image: &RgbImage, calibration: &CalibrationRange) -> Self {
        let width = image.width();
        let height = image.height();

        // par_chunks_mut rejects a zero chunk size; a degenerate raster
        // has no rows to split anyway.
        if width == 0 || height == 0 {
            return Self {
                width,
                height,
                values: Vec::new(),
            };
        }

        let row_len = width as usize;
        let mut values = vec![0.0f32; row_len * height as usize];

        values
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    let pixel = image.get_pixel(x as u32, y as u32);
                    let [r, g, b] = pixel.0;
                    *slot = if r == 0 && g == 0 && b == 0 {
                        f32::NAN
                    } else {
                        calibration.value_for(normalized_lightness(r, g, b)) as f32
                    };
                }
            });

        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at (x, y); panics if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height, "index out of bounds");
        self.values[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_black_decodes_to_nan() {
        let img = RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]));
        let field = ScalarField::decode(&img, &CalibrationRange::new(0.0, 100.0));
        assert_eq!(field.len(), 6);
        assert!(field.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_white_decodes_to_max() {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        let field = ScalarField::decode(&img, &CalibrationRange::new(200.0, 340.0));
        for v in field.values() {
            assert!((v - 340.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_near_black_is_data() {
        // (1,1,1) is data, not the no-data sentinel.
        let img = RgbImage::from_pixel(1, 1, Rgb([1, 1, 1]));
        let field = ScalarField::decode(&img, &CalibrationRange::new(0.0, 25.0));
        let v = field.get(0, 0);
        assert!(!v.is_nan());
        assert!(v > 0.0 && v < 1.0);
    }

    #[test]
    fn test_values_stay_in_range() {
        let calibration = CalibrationRange::new(-0.2, 1.0);
        let img = RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
        });
        let field = ScalarField::decode(&img, &calibration);
        for v in field.values() {
            if !v.is_nan() {
                assert!(*v >= -0.2 && *v <= 1.0, "value {} escaped range", v);
            }
        }
    }

    #[test]
    fn test_row_major_layout() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([0, 0, 0]));
        let field = ScalarField::decode(&img, &CalibrationRange::new(0.0, 1.0));
        assert!(!field.get(0, 0).is_nan());
        assert!(field.get(1, 0).is_nan());
        assert!(!field.get(0, 1).is_nan());
    }

    #[test]
    #[should_panic(expected = "value count")]
    fn test_from_values_rejects_bad_length() {
        ScalarField::from_values(3, 3, vec![0.0; 8]);
    }

    #[test]
    fn test_decode_empty_image() {
        for (w, h) in [(0u32, 4u32), (4, 0), (0, 0)] {
            let img = RgbImage::new(w, h);
            let field = ScalarField::decode(&img, &CalibrationRange::new(0.0, 100.0));
            assert_eq!(field.len(), 0);
            assert_eq!(field.width(), w);
            assert_eq!(field.height(), h);
        }
    }
}
