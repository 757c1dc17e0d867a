//! No-data-aware reduction of a decoded field.

use image::RgbImage;

use crate::field::ScalarField;

/// Spatial-average summary of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
    /// Mean of all data pixels, or `None` when every pixel was no-data.
    pub mean: Option<f64>,
    /// Count of no-data pixels.
    pub nan_count: usize,
    /// Total pixels in the field.
    pub total: usize,
}

/// Average the field, skipping NaN entries.
///
/// Accumulates in f64 so large regions do not lose precision to
/// repeated f32 rounding.
pub fn summarize(field: &ScalarField) -> FieldSummary {
    let mut sum = 0.0f64;
    let mut data_count = 0usize;

    for &v in field.values() {
        if v.is_nan() {
            continue;
        }
        sum += v as f64;
        data_count += 1;
    }

    let total = field.len();
    let mean = if data_count > 0 {
        Some(sum / data_count as f64)
    } else {
        None
    };

    FieldSummary {
        mean,
        nan_count: total - data_count,
        total,
    }
}

/// Mean R, G, B channel values across an image.
///
/// Diagnostic only: a capture that came back mostly one color usually
/// means the page had not finished drawing when the screenshot fired.
pub fn mean_rgb(image: &RgbImage) -> (f64, f64, f64) {
    let total = (image.width() as u64) * (image.height() as u64);
    if total == 0 {
        return (0.0, 0.0, 0.0);
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        sums[0] += pixel.0[0] as u64;
        sums[1] += pixel.0[1] as u64;
        sums[2] += pixel.0[2] as u64;
    }

    (
        sums[0] as f64 / total as f64,
        sums[1] as f64 / total as f64,
        sums[2] as f64 / total as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_skips_nan() {
        let field = ScalarField::from_values(2, 2, vec![10.0, f32::NAN, 20.0, 30.0]);
        let summary = summarize(&field);
        assert_eq!(summary.mean, Some(20.0));
        assert_eq!(summary.nan_count, 1);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_summarize_all_nan() {
        let field = ScalarField::from_values(2, 1, vec![f32::NAN, f32::NAN]);
        let summary = summarize(&field);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.nan_count, 2);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn test_summarize_no_nan() {
        let field = ScalarField::from_values(3, 1, vec![1.0, 2.0, 3.0]);
        let summary = summarize(&field);
        assert_eq!(summary.mean, Some(2.0));
        assert_eq!(summary.nan_count, 0);
    }

    #[test]
    fn test_mean_rgb() {
        use image::Rgb;
        let mut img = RgbImage::from_pixel(2, 1, Rgb([100, 0, 0]));
        img.put_pixel(1, 0, Rgb([200, 50, 0]));
        let (r, g, b) = mean_rgb(&img);
        assert_eq!(r, 150.0);
        assert_eq!(g, 25.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn test_mean_rgb_empty_image() {
        let img = RgbImage::new(0, 0);
        assert_eq!(mean_rgb(&img), (0.0, 0.0, 0.0));
    }
}
