//! Case-based nearest-neighbour glyph recogniser.
//!
//! The stored samples are the model: there are no trained parameters beyond
//! the case base. Training appends rows to the sample matrix, recognition is
//! a nearest-neighbour search over it, and persistence serializes the matrix
//! and its parallel label vector verbatim.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::GrayImage;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{MrzError, MrzResult, FEATURE_LEN, MAX_NEIGHBOUR_DISTANCE};
use crate::recognition::sample::prepare_sample;
use crate::recognition::Recogniser;

/// Nearest-neighbour recogniser over normalized glyph samples.
///
/// The model is append-only: samples are never removed, and recognition
/// reads the case base immutably, so a loaded instance can be shared across
/// threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestNeighbourRecogniser {
    /// One row per training sample.
    samples: Array2<f32>,
    /// Label of the sample in the matching row.
    labels: Vec<char>,
}

impl NearestNeighbourRecogniser {
    /// Creates an empty recogniser.
    pub fn new() -> Self {
        Self {
            samples: Array2::zeros((0, FEATURE_LEN)),
            labels: Vec::new(),
        }
    }

    /// Creates a recogniser from a model file written by
    /// [`Recogniser::save`].
    pub fn from_file(path: &Path) -> MrzResult<Self> {
        let mut recogniser = Self::new();
        recogniser.load(path)?;
        Ok(recogniser)
    }

    /// Number of stored training samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the recogniser has no training samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index and squared distance of the stored sample nearest to `query`.
    fn nearest(&self, query: &[f32]) -> Option<(usize, f32)> {
        self.samples
            .outer_iter()
            .enumerate()
            .map(|(index, row)| {
                let distance: f32 = row
                    .iter()
                    .zip(query)
                    .map(|(a, b)| {
                        let d = a - b;
                        d * d
                    })
                    .sum();
                (index, distance)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Checks the parallel-table invariant of a deserialized model.
    fn validate(&self) -> MrzResult<()> {
        if self.samples.nrows() != self.labels.len() {
            return Err(MrzError::Persistence {
                context: "load recogniser model".into(),
                source: format!(
                    "sample matrix has {} rows but {} labels",
                    self.samples.nrows(),
                    self.labels.len()
                )
                .into(),
            });
        }
        if self.samples.nrows() > 0 && self.samples.ncols() != FEATURE_LEN {
            return Err(MrzError::Persistence {
                context: "load recogniser model".into(),
                source: format!(
                    "sample matrix has {} columns, expected {}",
                    self.samples.ncols(),
                    FEATURE_LEN
                )
                .into(),
            });
        }
        Ok(())
    }
}

impl Default for NearestNeighbourRecogniser {
    fn default() -> Self {
        Self::new()
    }
}

impl Recogniser for NearestNeighbourRecogniser {
    fn learn(&mut self, glyph: &GrayImage, label: char, dark_on_light: bool) -> MrzResult<()> {
        let features = Array1::from(prepare_sample(glyph, dark_on_light));
        self.samples.push_row(features.view())?;
        self.labels.push(label);
        Ok(())
    }

    fn classify(&self, glyph: &GrayImage, dark_on_light: bool) -> MrzResult<Option<char>> {
        if self.is_empty() {
            return Err(MrzError::ModelNotLoaded);
        }
        let query = prepare_sample(glyph, dark_on_light);
        let Some((index, distance)) = self.nearest(&query) else {
            return Err(MrzError::ModelNotLoaded);
        };
        trace!(distance, label = %self.labels[index], "nearest neighbour");
        if distance <= MAX_NEIGHBOUR_DISTANCE {
            Ok(Some(self.labels[index]))
        } else {
            Ok(None)
        }
    }

    fn save(&self, path: &Path) -> MrzResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)
            .map_err(|e| MrzError::persistence("write recogniser model", e))
    }

    fn load(&mut self, path: &Path) -> MrzResult<()> {
        let reader = BufReader::new(File::open(path)?);
        let loaded: Self = bincode::deserialize_from(reader)
            .map_err(|e| MrzError::persistence("read recogniser model", e))?;
        loaded.validate()?;
        *self = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// A glyph with its left half dark and right half light.
    fn half_glyph(dark_left: bool) -> GrayImage {
        GrayImage::from_fn(14, 14, |x, _| {
            let left = x < 7;
            if left == dark_left {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn recognizes_trained_glyph() {
        let mut recogniser = NearestNeighbourRecogniser::new();
        recogniser.learn(&half_glyph(true), 'A', false).unwrap();
        assert_eq!(recogniser.len(), 1);
        let label = recogniser.classify(&half_glyph(true), false).unwrap();
        assert_eq!(label, Some('A'));
    }

    #[test]
    fn rejects_distant_glyph() {
        let mut recogniser = NearestNeighbourRecogniser::new();
        recogniser.learn(&half_glyph(true), 'A', false).unwrap();
        // The mirrored glyph differs in every pixel, far past the distance
        // threshold.
        let label = recogniser.classify(&half_glyph(false), false).unwrap();
        assert_eq!(label, None);
    }

    #[test]
    fn rejects_noise() {
        let mut recogniser = NearestNeighbourRecogniser::new();
        let mut square = GrayImage::new(14, 14);
        for y in 3..11 {
            for x in 3..11 {
                square.put_pixel(x, y, Luma([255]));
            }
        }
        recogniser.learn(&square, 'B', false).unwrap();
        let noise = GrayImage::from_fn(14, 14, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        assert_eq!(recogniser.classify(&noise, false).unwrap(), None);
    }

    #[test]
    fn empty_model_is_a_caller_defect() {
        let recogniser = NearestNeighbourRecogniser::new();
        assert!(matches!(
            recogniser.classify(&half_glyph(true), false),
            Err(MrzError::ModelNotLoaded)
        ));
    }

    #[test]
    fn persistence_round_trip_preserves_classification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let mut trained = NearestNeighbourRecogniser::new();
        trained.learn(&half_glyph(true), 'L', false).unwrap();
        trained.learn(&half_glyph(false), 'R', false).unwrap();
        trained.save(&path).unwrap();

        let restored = NearestNeighbourRecogniser::from_file(&path).unwrap();
        assert_eq!(restored.len(), trained.len());
        for glyph in [half_glyph(true), half_glyph(false)] {
            assert_eq!(
                restored.classify(&glyph, false).unwrap(),
                trained.classify(&glyph, false).unwrap()
            );
        }
    }
}
