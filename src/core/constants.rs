//! Constants used throughout the MRZ pipeline.
//!
//! This module defines the tuning constants shared by the localization,
//! segmentation and recognition stages. The geometric values encode the
//! printed geometry of ICAO machine-readable zones and the behaviour of the
//! morphological operators that isolate them.

/// The canonical height, in pixels, that document photos are rescaled to
/// before MRZ localization. All localization kernel sizes assume this scale.
pub const CANONICAL_HEIGHT: u32 = 600;

/// Structuring element used to emphasise individual dark characters and to
/// bridge the gaps between adjacent letters (width, height).
pub const TEXT_KERNEL: (u32, u32) = (13, 5);

/// Structuring element used to bridge the vertical gaps between MRZ lines
/// (width, height).
pub const LINE_KERNEL: (u32, u32) = (21, 21);

/// Standard deviation of the Gaussian smoothing applied before the blackhat
/// filter. Matches a 3x3 kernel.
pub const SMOOTHING_SIGMA: f32 = 0.8;

/// Number of erosion rounds applied after the line-bridging closing to break
/// overly fused regions back apart.
pub const EROSION_ROUNDS: u8 = 4;

/// Fraction of the canonical height zeroed out on every border to suppress
/// scan-edge artifacts.
pub const BORDER_MARGIN_FRACTION: f64 = 0.05;

/// Minimum width/height ratio for a contour to qualify as the MRZ band.
pub const MIN_BAND_ASPECT: f64 = 5.0;

/// Minimum ratio of band width to greyscale image height for a contour to
/// qualify as the MRZ band.
pub const MIN_BAND_COVERAGE: f64 = 0.5;

/// Fraction by which the winning bounding box is re-grown on each side to
/// compensate for erosion shrinkage.
pub const REGROW_FRACTION: f64 = 0.03;

/// Relative tolerance applied to the expected character cell envelope.
pub const CHAR_SIZE_TOLERANCE: f64 = 0.1;

/// Ratio of inter-line gap height to line height in a printed MRZ.
pub const LINE_SPACING: f64 = 1.0;

/// Extra scaling of the minimum expected character width. OCR-B is
/// monospaced but some glyphs are much narrower than their cell.
pub const MIN_CHAR_WIDTH_SCALE: f64 = 0.25;

/// Extra scaling of the minimum expected character height. Line spacing
/// varies widely between printers.
pub const MIN_CHAR_HEIGHT_SCALE: f64 = 0.75;

/// A layout hypothesis must score strictly above this confidence, and above
/// the competing hypothesis, to be accepted.
pub const MIN_LAYOUT_CONFIDENCE: f32 = 0.75;

/// Side length of the normalized glyph sample fed to the recogniser.
pub const SAMPLE_SIDE: u32 = 14;

/// Length of the flattened feature vector, `SAMPLE_SIDE` squared.
pub const FEATURE_LEN: usize = (SAMPLE_SIDE * SAMPLE_SIDE) as usize;

/// Maximum squared distance between a query sample and its nearest
/// neighbour for the neighbour's label to be accepted.
pub const MAX_NEIGHBOUR_DISTANCE: f32 = 3_000_000.0;

/// The alphabet of valid MRZ characters: A to Z, digits, and the `<` filler.
pub const MRZ_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789<";

/// Placeholder substituted into transcriptions for rejected glyphs.
pub const REJECT_CHAR: char = '?';

/// Batches larger than this are processed in parallel.
pub const PARALLEL_THRESHOLD: usize = 4;
