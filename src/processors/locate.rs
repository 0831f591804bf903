//! MRZ band localization.
//!
//! Finds the machine-readable zone inside an arbitrary document photo using
//! morphological analysis: a blackhat filter emphasises small dark text, the
//! horizontal gradient picks out character strokes, and two rounds of closing
//! fuse the strokes into a single wide band that is then selected by its
//! geometry. No learned parameters are involved; the output is deterministic
//! for identical input pixels.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::horizontal_sobel;
use imageproc::morphology::{erode, grayscale_close, Mask};
use itertools::Itertools;
use tracing::debug;

use crate::core::{
    contour_area, MrzError, MrzResult, Rect, BORDER_MARGIN_FRACTION, CANONICAL_HEIGHT,
    EROSION_ROUNDS, LINE_KERNEL, MIN_BAND_ASPECT, MIN_BAND_COVERAGE, REGROW_FRACTION,
    SMOOTHING_SIGMA, TEXT_KERNEL,
};
use crate::utils::StageObserver;

/// The located MRZ band.
#[derive(Debug, Clone)]
pub struct MrzRegion {
    /// Bounding rectangle of the band in the original image's coordinates.
    pub rect: Rect,
    /// The cropped band pixels.
    pub image: RgbImage,
}

/// Locates the MRZ band within a document photo.
///
/// The defaults implement the standard localization geometry; fields are
/// public so callers with unusual capture setups can tune them.
#[derive(Debug, Clone)]
pub struct MrzLocator {
    /// Height the photo is rescaled to before processing.
    pub canonical_height: u32,
    /// Structuring element for the blackhat and letter-gap closing steps.
    pub text_kernel: (u32, u32),
    /// Structuring element for the line-gap closing step.
    pub line_kernel: (u32, u32),
    /// Gaussian smoothing strength applied before the blackhat.
    pub smoothing_sigma: f32,
    /// Erosion rounds applied after the line-gap closing.
    pub erosion_rounds: u8,
    /// Fraction of the canonical height removed from every border.
    pub border_margin: f64,
    /// Minimum width/height ratio of an acceptable band.
    pub min_aspect: f64,
    /// Minimum band width relative to the greyscale image height.
    pub min_coverage: f64,
    /// Fraction by which the accepted band is re-grown per side.
    pub regrow: f64,
}

impl Default for MrzLocator {
    fn default() -> Self {
        Self {
            canonical_height: CANONICAL_HEIGHT,
            text_kernel: TEXT_KERNEL,
            line_kernel: LINE_KERNEL,
            smoothing_sigma: SMOOTHING_SIGMA,
            erosion_rounds: EROSION_ROUNDS,
            border_margin: BORDER_MARGIN_FRACTION,
            min_aspect: MIN_BAND_ASPECT,
            min_coverage: MIN_BAND_COVERAGE,
            regrow: REGROW_FRACTION,
        }
    }
}

impl MrzLocator {
    /// Locates the MRZ band in `image`.
    ///
    /// On success the returned rectangle is expressed in `image`'s own
    /// coordinate space and is fully contained within its bounds. Failure to
    /// find a qualifying band is reported as [`MrzError::RegionNotFound`]
    /// and means only that this image yields no further processing.
    ///
    /// Intermediate images are handed to `observer` after each stage.
    pub fn locate(&self, image: &RgbImage, observer: &dyn StageObserver) -> MrzResult<MrzRegion> {
        let (orig_w, orig_h) = image.dimensions();
        if orig_w == 0 || orig_h == 0 {
            return Err(MrzError::invalid_input("document image has zero size"));
        }

        // Work at a fixed height so the kernel geometry is scale-invariant.
        let scaled_w = ((u64::from(orig_w) * u64::from(self.canonical_height))
            / u64::from(orig_h))
        .max(1) as u32;
        let resized = imageops::resize(image, scaled_w, self.canonical_height, FilterType::Triangle);
        let grey = imageops::grayscale(&resized);

        let text_mask = rect_mask(self.text_kernel.0, self.text_kernel.1);
        let smoothed = gaussian_blur_f32(&grey, self.smoothing_sigma);
        let blackhat = blackhat(&smoothed, &text_mask);
        observer.stage("blackhat", &blackhat);

        let gradient = normalized_horizontal_gradient(&blackhat);
        observer.stage("gradient", &gradient);

        // Bridge the gaps between adjacent letters, then binarize.
        let closed = grayscale_close(&gradient, &text_mask);
        let binary = threshold(&closed, otsu_level(&closed), ThresholdType::Binary);
        observer.stage("letter_closing", &binary);

        // Bridge the gaps between MRZ lines, then erode to break apart
        // regions the closing fused together.
        let line_mask = rect_mask(self.line_kernel.0, self.line_kernel.1);
        let fused = grayscale_close(&binary, &line_mask);
        let eroded = erode(&fused, Norm::LInf, self.erosion_rounds);
        observer.stage("line_closing", &eroded);

        // Thresholding can pick up scan-edge artifacts; drop a margin band
        // on all four borders.
        let margin = (f64::from(self.canonical_height) * self.border_margin) as u32;
        let (mask_w, mask_h) = eroded.dimensions();
        if mask_w <= 2 * margin || mask_h <= 2 * margin {
            return Err(MrzError::RegionNotFound);
        }
        let mask =
            imageops::crop_imm(&eroded, margin, margin, mask_w - 2 * margin, mask_h - 2 * margin)
                .to_image();
        observer.stage("border_removal", &mask);

        let band = self.qualifying_band(&mask).ok_or(MrzError::RegionNotFound)?;

        // Undo the border-removal offset, re-grow what the erosions shrank,
        // and map back into the original image's coordinate space.
        let restored = band.translate(margin, margin);
        let grow_x = (f64::from(restored.right()) * self.regrow) as u32;
        let grow_y = (f64::from(restored.bottom()) * self.regrow) as u32;
        let grown = restored
            .grow(grow_x, grow_y)
            .clip_to(scaled_w, self.canonical_height);
        let scale = f64::from(orig_w) / f64::from(scaled_w);
        let mapped = grown.scale(scale).clip_to(orig_w, orig_h);
        if mapped.is_empty() {
            return Err(MrzError::RegionNotFound);
        }
        debug!(
            x = mapped.x,
            y = mapped.y,
            width = mapped.width,
            height = mapped.height,
            "located MRZ band"
        );

        let cropped =
            imageops::crop_imm(image, mapped.x, mapped.y, mapped.width, mapped.height).to_image();
        Ok(MrzRegion {
            rect: mapped,
            image: cropped,
        })
    }

    /// First contour, in decreasing area order, whose bounding box has MRZ
    /// band geometry: much wider than tall, spanning a large part of the
    /// document.
    fn qualifying_band(&self, mask: &GrayImage) -> Option<Rect> {
        find_contours::<u32>(mask)
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| (contour_area(&c.points), Rect::bounding(c)))
            .sorted_by(|a, b| b.0.total_cmp(&a.0))
            .map(|(_, rect)| rect)
            .find(|rect| {
                let aspect = f64::from(rect.width) / f64::from(rect.height.max(1));
                let coverage = f64::from(rect.width) / f64::from(self.canonical_height);
                aspect > self.min_aspect && coverage > self.min_coverage
            })
    }
}

/// Builds a filled rectangular structuring element centred on its middle
/// pixel.
fn rect_mask(width: u32, height: u32) -> Mask {
    let shape = GrayImage::from_pixel(width, height, Luma([255u8]));
    Mask::from_image(&shape, (width / 2) as u8, (height / 2) as u8)
}

/// Blackhat filter: the closing of the image minus the image. Emphasises
/// dark features smaller than the structuring element on a lighter
/// background, independent of overall brightness.
fn blackhat(image: &GrayImage, mask: &Mask) -> GrayImage {
    let closed = grayscale_close(image, mask);
    let mut out = GrayImage::new(image.width(), image.height());
    for ((o, c), i) in out.pixels_mut().zip(closed.pixels()).zip(image.pixels()) {
        o.0[0] = c.0[0].saturating_sub(i.0[0]);
    }
    out
}

/// Magnitude of the horizontal Sobel gradient, min-max normalized into the
/// full 0 to 255 range.
fn normalized_horizontal_gradient(image: &GrayImage) -> GrayImage {
    let gradient = horizontal_sobel(image);
    let mut lo = i32::MAX;
    let mut hi = i32::MIN;
    for p in gradient.pixels() {
        let v = i32::from(p.0[0]).abs();
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let mut out = GrayImage::new(image.width(), image.height());
    if hi > lo {
        let range = f64::from(hi - lo);
        for (o, g) in out.pixels_mut().zip(gradient.pixels()) {
            let v = f64::from(i32::from(g.0[0]).abs() - lo);
            o.0[0] = (255.0 * v / range) as u8;
        }
    }
    out
}
