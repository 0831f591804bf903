//! Glyph normalization for the recogniser.

use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::core::SAMPLE_SIDE;

/// Normalizes a glyph image into the fixed-length feature vector the
/// recogniser operates on.
///
/// The glyph is optionally inverted (`dark_on_light` indicates dark glyphs
/// on a light background), resized to the canonical sample grid, binarized
/// with Otsu's threshold, and flattened row-major into `f32` values of 0 or
/// 255.
pub fn prepare_sample(glyph: &GrayImage, dark_on_light: bool) -> Vec<f32> {
    let mut grey = glyph.clone();
    if dark_on_light {
        imageops::invert(&mut grey);
    }
    let resized = imageops::resize(&grey, SAMPLE_SIDE, SAMPLE_SIDE, FilterType::Triangle);
    let binary = threshold(&resized, otsu_level(&resized), ThresholdType::Binary);
    binary.pixels().map(|p| f32::from(p.0[0])).collect()
}
