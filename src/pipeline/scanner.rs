//! The MRZ scanning pipeline.
//!
//! [`MrzScanner`] wires the stages together: locate the band, binarize it,
//! segment it into character cells, and classify each cell. Each image is
//! processed independently and synchronously; the recogniser model is the
//! only shared state and is read immutably during scanning, so batches can
//! fan out across threads.

use std::path::{Path, PathBuf};

use image::{imageops, GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{MrzResult, Rect, PARALLEL_THRESHOLD, REJECT_CHAR};
use crate::domain::MrzLayout;
use crate::pipeline::ScannerConfig;
use crate::processors::{CharacterSegmenter, MrzLocator, Segmentation};
use crate::recognition::Recogniser;
use crate::utils::{load_image, segmentation_overlay, DirectoryObserver, NoopObserver, StageObserver};

/// A transcribed MRZ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MrzScan {
    /// The resolved layout.
    pub layout: MrzLayout,
    /// Confidence score of the TD1 hypothesis.
    pub td1_confidence: f32,
    /// Confidence score of the TD3 hypothesis.
    pub td3_confidence: f32,
    /// Bounding rectangle of the MRZ band in the original image.
    pub region: Rect,
    /// Transcribed text, one string per MRZ line, with
    /// [`REJECT_CHAR`] standing in for rejected glyphs.
    pub lines: Vec<String>,
}

impl MrzScan {
    /// Confidence score of the resolved layout.
    pub fn confidence(&self) -> f32 {
        match self.layout {
            MrzLayout::Td1 => self.td1_confidence,
            MrzLayout::Td3 => self.td3_confidence,
            MrzLayout::Unknown => 0.0,
        }
    }

    /// The transcription as a single newline-separated string.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Outcome of one image within a batch scan.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The image that was processed.
    pub path: PathBuf,
    /// The transcription, or `None` when the image was skipped.
    pub scan: Option<MrzScan>,
}

/// The end-to-end MRZ scanning pipeline.
pub struct MrzScanner {
    locator: MrzLocator,
    segmenter: CharacterSegmenter,
    recogniser: Box<dyn Recogniser>,
    observer: Box<dyn StageObserver>,
}

impl MrzScanner {
    /// Creates a scanner around a trained recogniser, with default stage
    /// parameters and no debug observation.
    pub fn new(recogniser: Box<dyn Recogniser>) -> Self {
        Self {
            locator: MrzLocator::default(),
            segmenter: CharacterSegmenter::default(),
            recogniser,
            observer: Box::new(NoopObserver),
        }
    }

    /// Builds a scanner from a configuration: constructs the configured
    /// engine, loads its model once, and attaches a directory observer when
    /// a debug directory is set.
    ///
    /// The recogniser is loaded a single time here and reused for every
    /// character of every image scanned through this instance.
    pub fn from_config(config: &ScannerConfig) -> MrzResult<Self> {
        let mut recogniser = config.recogniser.build();
        recogniser.load(&config.model_path)?;
        let mut scanner = Self::new(recogniser);
        if let Some(dir) = &config.debug_dir {
            scanner.observer = Box::new(DirectoryObserver::new(dir.clone())?);
        }
        Ok(scanner)
    }

    /// Replaces the debug observer.
    pub fn with_observer(mut self, observer: Box<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replaces the locator.
    pub fn with_locator(mut self, locator: MrzLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Scans one document image.
    ///
    /// Fails with [`crate::MrzError::RegionNotFound`] or
    /// [`crate::MrzError::LayoutIndeterminate`] when the image yields no
    /// MRZ; both mean "skip this image", not that the batch is broken.
    pub fn scan(&self, image: &RgbImage) -> MrzResult<MrzScan> {
        let region = self.locator.locate(image, self.observer.as_ref())?;

        let grey = imageops::grayscale(&region.image);
        let band = threshold(&grey, otsu_level(&grey), ThresholdType::Binary);
        self.observer.stage("band_threshold", &band);

        let segmentation = self.segmenter.segment(&band)?;
        if self.observer.enabled() {
            self.observer
                .overlay("segmentation", &segmentation_overlay(&band, &segmentation));
        }

        let lines = self.transcribe(&band, &segmentation)?;
        info!(
            layout = %segmentation.layout,
            confidence = segmentation.confidence(),
            "transcribed MRZ"
        );
        Ok(MrzScan {
            layout: segmentation.layout,
            td1_confidence: segmentation.td1_confidence,
            td3_confidence: segmentation.td3_confidence,
            region: region.rect,
            lines,
        })
    }

    /// Scans an image loaded from a file.
    pub fn scan_path(&self, path: &Path) -> MrzResult<MrzScan> {
        let image = load_image(path)?;
        self.scan(&image)
    }

    /// Scans a batch of images, skipping the ones that fail with per-image
    /// errors and reporting them as `None`.
    ///
    /// Larger batches fan out across threads; the pipeline is stateless per
    /// image and the recogniser is shared read-only. Errors that are not
    /// per-image conditions abort the batch.
    pub fn scan_batch(&self, paths: &[PathBuf]) -> MrzResult<Vec<BatchOutcome>> {
        if paths.len() > PARALLEL_THRESHOLD {
            paths.par_iter().map(|p| self.batch_item(p)).collect()
        } else {
            paths.iter().map(|p| self.batch_item(p)).collect()
        }
    }

    fn batch_item(&self, path: &Path) -> MrzResult<BatchOutcome> {
        match self.scan_path(path) {
            Ok(scan) => Ok(BatchOutcome {
                path: path.to_path_buf(),
                scan: Some(scan),
            }),
            Err(error) if error.is_per_image() => {
                warn!(path = %path.display(), %error, "skipping image");
                Ok(BatchOutcome {
                    path: path.to_path_buf(),
                    scan: None,
                })
            }
            Err(error) => Err(error),
        }
    }

    /// Crops each character cell out of the band and classifies it. Cells
    /// are stored relative to the segmentation's border crop; rejected
    /// glyphs become placeholder characters and never abort the line.
    fn transcribe(&self, band: &GrayImage, segmentation: &Segmentation) -> MrzResult<Vec<String>> {
        let border = segmentation.border;
        let mut lines = Vec::with_capacity(segmentation.lines.len());
        for cells in &segmentation.lines {
            let mut text = String::with_capacity(cells.len());
            for cell in cells {
                let absolute = cell.translate(border.x, border.y);
                let glyph = imageops::crop_imm(
                    band,
                    absolute.x,
                    absolute.y,
                    absolute.width,
                    absolute.height,
                )
                .to_image();
                match self.recogniser.classify(&glyph, true)? {
                    Some(label) => text.push(label),
                    None => {
                        debug!(x = absolute.x, y = absolute.y, "glyph rejected");
                        text.push(REJECT_CHAR);
                    }
                }
            }
            lines.push(text);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::NearestNeighbourRecogniser;
    use image::Luma;

    /// A white TD3-geometry band with identical glyph marks in every cell.
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

    fn glyph_mark() -> GrayImage {
        GrayImage::from_pixel(6, 14, Luma([0]))
    }

    #[test]
    fn transcribes_every_cell() {
        let mut recogniser = NearestNeighbourRecogniser::new();
        recogniser.learn(&glyph_mark(), '<', true).unwrap();
        let scanner = MrzScanner::new(Box::new(recogniser));

        let band = td3_band();
        let segmentation = scanner.segmenter.segment(&band).unwrap();
        let lines = scanner.transcribe(&band, &segmentation).unwrap();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line, &"<".repeat(44));
        }
    }

    #[test]
    fn rejection_becomes_placeholder() {
        let mut recogniser = NearestNeighbourRecogniser::new();
        // Train on a pattern unlike the solid band glyphs.
        let distant = GrayImage::from_fn(14, 14, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        recogniser.learn(&distant, 'A', false).unwrap();
        let scanner = MrzScanner::new(Box::new(recogniser));

        let band = td3_band();
        let segmentation = scanner.segmenter.segment(&band).unwrap();
        let lines = scanner.transcribe(&band, &segmentation).unwrap();
        for line in &lines {
            assert_eq!(line, &REJECT_CHAR.to_string().repeat(44));
        }
    }

    #[test]
    fn scan_text_joins_lines() {
        let scan = MrzScan {
            layout: MrzLayout::Td3,
            td1_confidence: 0.0,
            td3_confidence: 1.0,
            region: Rect::new(0, 0, 10, 10),
            lines: vec!["AB".into(), "CD".into()],
        };
        assert_eq!(scan.text(), "AB\nCD");
        assert!((scan.confidence() - 1.0).abs() < f32::EPSILON);
    }
}
