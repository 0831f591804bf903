//! Error types for the MRZ pipeline.
//!
//! A single [`MrzError`] enum covers every stage. Two variants,
//! [`MrzError::RegionNotFound`] and [`MrzError::LayoutIndeterminate`], are
//! expected per-image outcomes rather than defects: batch callers log them
//! and move on to the next image. Everything else indicates a broken input,
//! a broken model file, or a caller bug and should stop the run.

use thiserror::Error;

/// Errors produced while locating, segmenting or transcribing an MRZ.
#[derive(Error, Debug)]
pub enum MrzError {
    /// An image could not be decoded.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// No contour in the processed document mask qualified as an MRZ band.
    #[error("no MRZ candidate region found")]
    RegionNotFound,

    /// Neither layout hypothesis scored high enough to be accepted.
    #[error("MRZ layout indeterminate: {td1:.2} confidence TD1, {td3:.2} confidence TD3")]
    LayoutIndeterminate {
        /// Confidence score for the TD1 hypothesis.
        td1: f32,
        /// Confidence score for the TD3 hypothesis.
        td3: f32,
    },

    /// `classify` was invoked on a recogniser with no training samples.
    ///
    /// This is a caller defect, not a per-image condition: load or train a
    /// model before recognising.
    #[error("recogniser has no training samples loaded")]
    ModelNotLoaded,

    /// Input violated a structural precondition.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Reading or writing the persisted recogniser model failed.
    #[error("model persistence: {context}")]
    Persistence {
        /// What was being persisted when the error occurred.
        context: String,
        /// The underlying serialization or validation error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A sample matrix operation failed.
    #[error("sample matrix")]
    Sample(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl MrzError {
    /// Creates an `InvalidInput` error from any message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a `Persistence` error with context.
    pub fn persistence(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Whether this error is an expected per-image outcome.
    ///
    /// Batch drivers skip images that fail with a per-image error and keep
    /// processing; any other error aborts the batch.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            Self::ImageLoad(_) | Self::RegionNotFound | Self::LayoutIndeterminate { .. }
        )
    }
}

/// Convenient result alias used across the crate.
pub type MrzResult<T> = Result<T, MrzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_image_classification() {
        assert!(MrzError::RegionNotFound.is_per_image());
        assert!(MrzError::LayoutIndeterminate { td1: 0.1, td3: 0.2 }.is_per_image());
        assert!(!MrzError::ModelNotLoaded.is_per_image());
        assert!(!MrzError::invalid_input("bad").is_per_image());
    }
}
