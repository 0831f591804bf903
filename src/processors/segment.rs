//! Character segmentation and layout classification of the MRZ band.
//!
//! The band arrives already binarized with text dark on a light background.
//! Segmentation strips any residual border, extracts character-sized
//! contours, and scores the two known layouts against the candidate
//! geometry. Layout classification and segmentation succeed or fail
//! together: a band whose candidates fit neither layout confidently is
//! reported as indeterminate.

use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use tracing::debug;

use crate::core::{
    MrzError, MrzResult, Rect, CHAR_SIZE_TOLERANCE, LINE_SPACING, MIN_CHAR_HEIGHT_SCALE,
    MIN_CHAR_WIDTH_SCALE, MIN_LAYOUT_CONFIDENCE,
};
use crate::domain::MrzLayout;
use crate::processors::border::largest_region_rect;

/// Result of segmenting an MRZ band.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// The accepted layout. Always [`MrzLayout::Td1`] or [`MrzLayout::Td3`].
    pub layout: MrzLayout,
    /// Confidence score of the TD1 hypothesis.
    pub td1_confidence: f32,
    /// Confidence score of the TD3 hypothesis.
    pub td3_confidence: f32,
    /// The border crop applied before contour extraction, in band
    /// coordinates. Character rectangles are relative to this crop.
    pub border: Rect,
    /// Character candidate rectangles per line, in ascending x order.
    pub lines: Vec<Vec<Rect>>,
}

impl Segmentation {
    /// Confidence score of the accepted layout.
    pub fn confidence(&self) -> f32 {
        match self.layout {
            MrzLayout::Td1 => self.td1_confidence,
            MrzLayout::Td3 => self.td3_confidence,
            MrzLayout::Unknown => 0.0,
        }
    }
}

/// Expected character cell size envelope, derived from the band dimensions
/// and a layout hypothesis.
#[derive(Debug, Clone, Copy)]
struct CellEnvelope {
    min_width: f64,
    min_height: f64,
    max_width: f64,
    max_height: f64,
}

impl CellEnvelope {
    fn admits(&self, rect: &Rect) -> bool {
        let w = f64::from(rect.width);
        let h = f64::from(rect.height);
        w >= self.min_width && w <= self.max_width && h >= self.min_height && h <= self.max_height
    }
}

/// Segments a binarized MRZ band into per-line character candidates and
/// infers which layout the band follows.
#[derive(Debug, Clone)]
pub struct CharacterSegmenter {
    /// Relative tolerance applied to the expected cell envelope.
    pub size_tolerance: f64,
    /// Inter-line gap height as a multiple of the line height.
    pub line_spacing: f64,
    /// Extra scaling of the minimum cell width, absorbing narrow glyphs.
    pub min_width_scale: f64,
    /// Extra scaling of the minimum cell height, absorbing spacing variance.
    pub min_height_scale: f64,
    /// A hypothesis must score strictly above this, and above its rival, to
    /// be accepted.
    pub min_confidence: f32,
}

impl Default for CharacterSegmenter {
    fn default() -> Self {
        Self {
            size_tolerance: CHAR_SIZE_TOLERANCE,
            line_spacing: LINE_SPACING,
            min_width_scale: MIN_CHAR_WIDTH_SCALE,
            min_height_scale: MIN_CHAR_HEIGHT_SCALE,
            min_confidence: MIN_LAYOUT_CONFIDENCE,
        }
    }
}

impl CharacterSegmenter {
    /// Segments `band`, a binary image with text dark on a light background.
    ///
    /// Returns the confidence of both layout hypotheses together with the
    /// winning layout's line assignments, or
    /// [`MrzError::LayoutIndeterminate`] when neither hypothesis scores
    /// strictly above both the minimum confidence and its rival.
    pub fn segment(&self, band: &GrayImage) -> MrzResult<Segmentation> {
        let border = largest_region_rect(band);
        if border.is_empty() {
            return Err(MrzError::LayoutIndeterminate { td1: 0.0, td3: 0.0 });
        }
        let mut cropped =
            imageops::crop_imm(band, border.x, border.y, border.width, border.height).to_image();
        // Character contours are extracted with text as foreground.
        imageops::invert(&mut cropped);

        let envelope = self.cell_envelope(cropped.width(), cropped.height(), MrzLayout::Unknown);
        let candidates = character_candidates(&cropped, &envelope);
        debug!(candidates = candidates.len(), "extracted character candidates");

        let td1 = self.layout_confidence(cropped.height(), MrzLayout::Td1, &candidates);
        let td3 = self.layout_confidence(cropped.height(), MrzLayout::Td3, &candidates);

        let layout = if td1 > td3.max(self.min_confidence) {
            MrzLayout::Td1
        } else if td3 > td1.max(self.min_confidence) {
            MrzLayout::Td3
        } else {
            debug!(td1, td3, "layout indeterminate");
            return Err(MrzError::LayoutIndeterminate { td1, td3 });
        };

        let (mut lines, _) = assign_to_lines(cropped.height(), &candidates, layout.line_count());
        for line in &mut lines {
            line.sort_by_key(|rect| rect.x);
        }
        debug!(%layout, td1, td3, "accepted layout");

        Ok(Segmentation {
            layout,
            td1_confidence: td1,
            td3_confidence: td3,
            border,
            lines,
        })
    }

    /// Confidence that `candidates` follow `layout` within a band of the
    /// given height.
    ///
    /// Zero when under half the layout's cells found a candidate, when more
    /// than a fifth of the candidates align with no line, or when any line
    /// holds more candidates than the layout has columns. Otherwise the
    /// fraction of cells with an aligned candidate, in `[0, 1]`.
    pub fn layout_confidence(
        &self,
        band_height: u32,
        layout: MrzLayout,
        candidates: &[Rect],
    ) -> f32 {
        let Some((line_count, chars_per_line)) = layout.grid() else {
            return 0.0;
        };
        let expected = line_count * chars_per_line;
        if candidates.len() < (expected / 2) as usize {
            return 0.0;
        }
        let (lines, indeterminate) = assign_to_lines(band_height, candidates, line_count);
        if indeterminate.len() > candidates.len() / 5 {
            return 0.0;
        }
        if lines.iter().any(|line| line.len() > chars_per_line as usize) {
            return 0.0;
        }
        let aligned: usize = lines.iter().map(Vec::len).sum();
        aligned as f32 / expected as f32
    }

    /// Expected character cell envelope for a band of the given dimensions.
    ///
    /// For [`MrzLayout::Unknown`] the envelope spans both known layouts, so
    /// a single contour pass can feed both hypotheses.
    fn cell_envelope(&self, band_width: u32, band_height: u32, layout: MrzLayout) -> CellEnvelope {
        let (min_lines, max_lines, min_chars, max_chars) = match layout.grid() {
            Some((lines, chars)) => (lines, lines, chars, chars),
            None => {
                let lines = MrzLayout::KNOWN.map(MrzLayout::line_count);
                let chars = MrzLayout::KNOWN.map(MrzLayout::chars_per_line);
                (
                    lines.iter().copied().min().unwrap_or(0),
                    lines.iter().copied().max().unwrap_or(0),
                    chars.iter().copied().min().unwrap_or(0),
                    chars.iter().copied().max().unwrap_or(0),
                )
            }
        };
        // Each line contributes one line-height of glyphs plus one
        // inter-line gap, except the last.
        let rows = |lines: u32| f64::from(lines) * (self.line_spacing + 1.0) - 1.0;
        let w = f64::from(band_width);
        let h = f64::from(band_height);
        let tolerance = 1.0 + self.size_tolerance;
        CellEnvelope {
            min_width: w / f64::from(max_chars.max(1)) / tolerance * self.min_width_scale,
            min_height: h / rows(max_lines).max(1.0) / tolerance * self.min_height_scale,
            max_width: w / f64::from(min_chars.max(1)) * tolerance,
            max_height: h / rows(min_lines).max(1.0) * tolerance,
        }
    }
}

/// External contours of `image` whose bounding boxes fall inside the cell
/// envelope. Everything else is rejected silently.
fn character_candidates(image: &GrayImage, envelope: &CellEnvelope) -> Vec<Rect> {
    find_contours::<u32>(image)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(Rect::bounding)
        .filter(|rect| envelope.admits(rect))
        .collect()
}

/// Partitions the band height into equal horizontal strips and assigns each
/// candidate to the strip that fully contains it, provided its center also
/// sits close to the strip's midline. Candidates matching no strip are
/// returned separately as indeterminate.
fn assign_to_lines(
    band_height: u32,
    candidates: &[Rect],
    line_count: u32,
) -> (Vec<Vec<Rect>>, Vec<Rect>) {
    let mut lines = vec![Vec::new(); line_count as usize];
    let mut indeterminate = Vec::new();
    let h = f64::from(band_height);
    let n = f64::from(line_count.max(1));
    for &bbox in candidates {
        let slot = (0..line_count).find(|&i| {
            let top = h * f64::from(i) / n;
            let bottom = h * f64::from(i + 1) / n;
            let middle = h * (f64::from(i) + 0.5) / n;
            f64::from(bbox.y) >= top
                && f64::from(bbox.bottom()) <= bottom
                && (bbox.center_y() - middle).abs() < h / (3.0 * n)
        });
        match slot {
            Some(i) => lines[i as usize].push(bbox),
            None => indeterminate.push(bbox),
        }
    }
    (lines, indeterminate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// A white 440x60 band with two rows of 44 dark glyph marks, matching
    /// TD3 geometry.
    fn td3_band() -> GrayImage {
        let mut band = GrayImage::from_pixel(440, 60, Luma([255]));
        for row in 0..2u32 {
            let y0 = 8 + row * 30;
            for col in 0..44u32 {
                let x0 = 2 + col * 10;
                for dy in 0..14 {
                    for dx in 0..6 {
                        band.put_pixel(x0 + dx, y0 + dy, Luma([0]));
                    }
                }
            }
        }
        band
    }

    #[test]
    fn classifies_td3_band() {
        let segmenter = CharacterSegmenter::default();
        let segmentation = segmenter.segment(&td3_band()).expect("layout accepted");
        assert_eq!(segmentation.layout, MrzLayout::Td3);
        assert!(segmentation.td3_confidence > 0.95);
        assert!(segmentation.td3_confidence <= 1.0);
        assert!(segmentation.td3_confidence > segmentation.td1_confidence);
        assert_eq!(segmentation.lines.len(), 2);
        for line in &segmentation.lines {
            assert_eq!(line.len(), 44);
        }
    }

    #[test]
    fn lines_are_sorted_by_x() {
        let segmenter = CharacterSegmenter::default();
        let segmentation = segmenter.segment(&td3_band()).expect("layout accepted");
        for line in &segmentation.lines {
            for pair in line.windows(2) {
                assert!(pair[0].x <= pair[1].x);
            }
        }
    }

    #[test]
    fn blank_band_is_indeterminate() {
        let segmenter = CharacterSegmenter::default();
        let band = GrayImage::from_pixel(440, 60, Luma([0]));
        assert!(matches!(
            segmenter.segment(&band),
            Err(MrzError::LayoutIndeterminate { .. })
        ));
    }

    #[test]
    fn confidence_zero_when_too_few_candidates() {
        let segmenter = CharacterSegmenter::default();
        let candidates = vec![Rect::new(0, 0, 6, 14); 40];
        assert_eq!(
            segmenter.layout_confidence(60, MrzLayout::Td3, &candidates),
            0.0
        );
    }

    #[test]
    fn confidence_zero_when_too_many_indeterminate() {
        let segmenter = CharacterSegmenter::default();
        // 40 aligned with line 0 of TD3, 11 straddling the line boundary.
        let mut candidates = Vec::new();
        for i in 0..40u32 {
            candidates.push(Rect::new(i * 10, 8, 6, 14));
        }
        for i in 0..11u32 {
            candidates.push(Rect::new(i * 10, 24, 6, 14));
        }
        assert_eq!(
            segmenter.layout_confidence(60, MrzLayout::Td3, &candidates),
            0.0
        );
    }

    #[test]
    fn confidence_zero_when_line_overfull() {
        let segmenter = CharacterSegmenter::default();
        // 46 candidates all aligned with the first of TD1's three lines.
        let candidates: Vec<Rect> = (0..46u32).map(|i| Rect::new(i * 6, 12, 4, 8)).collect();
        assert_eq!(
            segmenter.layout_confidence(90, MrzLayout::Td1, &candidates),
            0.0
        );
    }

    #[test]
    fn full_td1_grid_scores_high() {
        let segmenter = CharacterSegmenter::default();
        // 3 lines of 30 evenly spaced candidates matching TD1 geometry in a
        // 300x100 band: strips are ~33 pixels, glyphs 14 tall centred on
        // each strip's midline.
        let mut candidates = Vec::new();
        for line in 0..3u32 {
            let middle = (100.0 * (f64::from(line) + 0.5) / 3.0) as u32;
            for col in 0..30u32 {
                candidates.push(Rect::new(col * 10, middle - 7, 6, 14));
            }
        }
        let td1 = segmenter.layout_confidence(100, MrzLayout::Td1, &candidates);
        let td3 = segmenter.layout_confidence(100, MrzLayout::Td3, &candidates);
        assert!((td1 - 1.0).abs() < f32::EPSILON);
        assert!(td1 > td3);
    }
}
