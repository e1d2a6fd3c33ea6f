//! Feed aesthetic analysis
//!
//! Pipeline per image:
//!
//! ```text
//! bytes ──decode──▶ RGBA pixels ──median cut──▶ palette ──bin──▶ histogram
//! ```
//!
//! Candidates are scored by the cosine similarity of their histogram to the
//! feed histogram, mapped onto 0-100.

pub mod histogram;
pub mod palette;
pub mod similarity;

use serde::Serialize;
use thiserror::Error;

pub use histogram::ColorHistogram;
pub use palette::extract_palette;
pub use similarity::{cosine_similarity, fit_score};

/// 8-bit RGB color
pub type Rgb = [u8; 3];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no usable pixels (fully transparent or blank)")]
    NoUsablePixels,

    #[error("Palette size {0} out of range (2-256)")]
    InvalidPaletteSize(usize),
}

/// Palette and histogram of a single image
#[derive(Debug, Clone, Serialize)]
pub struct ImageProfile {
    pub palette: Vec<Rgb>,
    pub histogram: ColorHistogram,
}

/// Fit scores of both candidates against the feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub image_a_score: f64,
    pub image_b_score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageAnalyzer {
    pub palette_size: usize,
    pub histogram_bins: usize,
}

impl Default for ImageAnalyzer {
    fn default() -> Self {
        Self {
            palette_size: 8,
            histogram_bins: 32,
        }
    }
}

impl ImageAnalyzer {
    pub fn new(palette_size: usize, histogram_bins: usize) -> Self {
        Self {
            palette_size,
            histogram_bins,
        }
    }

    /// Decode an encoded image and build its color profile
    pub fn profile(&self, bytes: &[u8]) -> Result<ImageProfile, AnalysisError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let palette = extract_palette(rgba.pixels().map(|p| p.0), self.palette_size)?;
        let histogram = ColorHistogram::from_palette(&palette, self.histogram_bins);

        Ok(ImageProfile { palette, histogram })
    }

    /// Score both candidates against the feed screenshot
    pub fn compare(&self, feed: &[u8], image_a: &[u8], image_b: &[u8]) -> Result<Comparison, AnalysisError> {
        let feed = self.profile(feed)?;
        let a = self.profile(image_a)?;
        let b = self.profile(image_b)?;

        tracing::debug!(
            feed_colors = feed.palette.len(),
            a_colors = a.palette.len(),
            b_colors = b.palette.len(),
            "Palettes extracted"
        );

        Ok(Comparison {
            image_a_score: fit_score(&feed.histogram.values, &a.histogram.values),
            image_b_score: fit_score(&feed.histogram.values, &b.histogram.values),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use image::ImageFormat;

    #[test]
    fn test_similar_colors_score_higher() {
        let analyzer = ImageAnalyzer::default();
        let result = analyzer
            .compare(&png(&WARM), &png(&WARM_ALT), &png(&COOL))
            .unwrap();

        assert!(result.image_a_score > result.image_b_score);
        assert!((0.0..=100.0).contains(&result.image_a_score));
        assert!((0.0..=100.0).contains(&result.image_b_score));
    }

    #[test]
    fn test_identical_image_scores_full() {
        let analyzer = ImageAnalyzer::default();
        let feed = png(&WARM);
        let result = analyzer.compare(&feed, &feed, &png(&COOL)).unwrap();
        assert_eq!(result.image_a_score, 100.0);
    }

    #[test]
    fn test_decodes_jpeg() {
        let jpeg = encode(striped(&COOL, 48), ImageFormat::Jpeg);
        let profile = ImageAnalyzer::default().profile(&jpeg).unwrap();
        assert!(!profile.palette.is_empty());
        assert_eq!(profile.histogram.values.len(), 96);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = ImageAnalyzer::default().profile(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)));
    }

    #[test]
    fn test_blank_image_has_no_usable_pixels() {
        let blank = png(&[[255, 255, 255]]);
        let err = ImageAnalyzer::default().profile(&blank).unwrap_err();
        assert!(matches!(err, AnalysisError::NoUsablePixels));
    }
}
