//! Training the recogniser from a reference glyph strip.
//!
//! A glyph strip is a single image containing every charset character in
//! order, evenly spaced. [`SlidingWindows`] slices it into fixed-size
//! windows advanced by a constant offset; [`learn_strip`] pairs each window
//! with the matching charset character and feeds both to the recogniser.

use image::imageops;
use image::GrayImage;
use tracing::warn;

use crate::core::MrzResult;
use crate::recognition::Recogniser;

/// Iterator over fixed-size windows of an image, advanced by a constant
/// offset.
///
/// Iteration ends when the window leaves the image bounds or, if a limit is
/// set, after that many windows.
pub struct SlidingWindows<'a> {
    image: &'a GrayImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    step: (i64, i64),
    remaining: Option<usize>,
}

impl<'a> SlidingWindows<'a> {
    /// Creates an unlimited window iterator starting at the top-left corner.
    pub fn new(image: &'a GrayImage, window: (u32, u32), step: (i64, i64)) -> Self {
        Self {
            image,
            x: 0,
            y: 0,
            width: window.0,
            height: window.1,
            step,
            remaining: None,
        }
    }

    /// Limits iteration to at most `count` windows.
    pub fn take_windows(mut self, count: usize) -> Self {
        self.remaining = Some(count);
        self
    }

    /// Starts iteration at the given offset instead of the corner.
    pub fn starting_at(mut self, x: i64, y: i64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

impl Iterator for SlidingWindows<'_> {
    type Item = GrayImage;

    fn next(&mut self) -> Option<GrayImage> {
        if self.remaining == Some(0) {
            return None;
        }
        let (image_w, image_h) = self.image.dimensions();
        if self.x < 0
            || self.y < 0
            || self.x + i64::from(self.width) > i64::from(image_w)
            || self.y + i64::from(self.height) > i64::from(image_h)
        {
            return None;
        }
        let window = imageops::crop_imm(
            self.image,
            self.x as u32,
            self.y as u32,
            self.width,
            self.height,
        )
        .to_image();
        self.x += self.step.0;
        self.y += self.step.1;
        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
        Some(window)
    }
}

/// Trains `recogniser` on a glyph strip.
///
/// The strip is sliced into `window`-sized views advanced by `step`, and the
/// n-th window is taught as the n-th character of `answers`. Training stops
/// at whichever runs out first; a short strip is logged but not an error.
/// Returns the number of samples learned.
pub fn learn_strip(
    recogniser: &mut dyn Recogniser,
    strip: &GrayImage,
    answers: &str,
    window: (u32, u32),
    step: (i64, i64),
    dark_on_light: bool,
) -> MrzResult<usize> {
    let mut learned = 0;
    for (glyph, label) in SlidingWindows::new(strip, window, step).zip(answers.chars()) {
        recogniser.learn(&glyph, label, dark_on_light)?;
        learned += 1;
    }
    let expected = answers.chars().count();
    if learned < expected {
        warn!(learned, expected, "glyph strip ran out before the charset");
    }
    Ok(learned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MRZ_CHARSET;
    use crate::recognition::NearestNeighbourRecogniser;
    use image::Luma;

    #[test]
    fn windows_stop_at_image_edge() {
        let image = GrayImage::new(100, 30);
        let windows: Vec<_> = SlidingWindows::new(&image, (20, 30), (20, 0)).collect();
        assert_eq!(windows.len(), 5);
        assert!(windows.iter().all(|w| w.dimensions() == (20, 30)));
    }

    #[test]
    fn window_limit_applies() {
        let image = GrayImage::new(100, 30);
        let count = SlidingWindows::new(&image, (20, 30), (20, 0))
            .take_windows(3)
            .count();
        assert_eq!(count, 3);
    }

    #[test]
    fn start_offset_is_honoured() {
        let mut image = GrayImage::new(40, 10);
        image.put_pixel(25, 5, Luma([255]));
        let window = SlidingWindows::new(&image, (10, 10), (10, 0))
            .starting_at(20, 0)
            .next()
            .unwrap();
        assert_eq!(window.get_pixel(5, 5).0[0], 255);
    }

    /// Strip of distinct striped glyphs, one cell per charset character.
    /// Cell i carries a horizontal stripe for every set bit of i, so all
    /// cells are pairwise distinct at the recogniser's sample resolution.
    fn charset_strip(cell: u32) -> GrayImage {
        let count = MRZ_CHARSET.chars().count() as u32;
        let mut strip = GrayImage::new(cell * count, cell);
        for i in 0..count {
            for bit in 0..6u32 {
                if i & (1 << bit) != 0 {
                    for y in bit * 2..bit * 2 + 2 {
                        for x in 0..cell {
                            strip.put_pixel(i * cell + x, y, Luma([255]));
                        }
                    }
                }
            }
        }
        strip
    }

    #[test]
    fn strip_training_is_self_consistent() {
        let cell = 14;
        let strip = charset_strip(cell);
        let mut recogniser = NearestNeighbourRecogniser::new();
        let learned = learn_strip(
            &mut recogniser,
            &strip,
            MRZ_CHARSET,
            (cell, cell),
            (i64::from(cell), 0),
            false,
        )
        .unwrap();
        assert_eq!(learned, MRZ_CHARSET.chars().count());

        // Every training window classifies back to its own label.
        let windows = SlidingWindows::new(&strip, (cell, cell), (i64::from(cell), 0));
        for (window, expected) in windows.zip(MRZ_CHARSET.chars()) {
            assert_eq!(recogniser.classify(&window, false).unwrap(), Some(expected));
        }
    }

    #[test]
    fn short_strip_learns_what_it_can() {
        let strip = GrayImage::new(28, 14);
        let mut recogniser = NearestNeighbourRecogniser::new();
        let learned =
            learn_strip(&mut recogniser, &strip, MRZ_CHARSET, (14, 14), (14, 0), false).unwrap();
        assert_eq!(learned, 2);
    }
}
