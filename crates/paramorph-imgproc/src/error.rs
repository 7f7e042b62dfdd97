use paramorph_image::ImageError;

use crate::parallel::ParallelError;

/// Errors related to parabolic morphological operations.
///
/// Configuration errors are reported before any sample is processed, so an
/// `Err` never comes with a partially filtered image.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MorphologyError {
    /// A scale component is negative or not finite.
    #[error("Invalid scale {1} on axis {0}: scale must be finite and non-negative")]
    InvalidScale(usize, f64),

    /// The requested axis does not exist in the image.
    #[error("Invalid axis {0} for an image of dimension {1}")]
    InvalidAxis(usize, usize),

    /// A per-axis parameter or the image rank does not match the configured dimension.
    #[error("Dimension mismatch: expected {expected} axes, got {actual}")]
    DimensionMismatch {
        /// The configured number of axes.
        expected: usize,
        /// The number of axes supplied.
        actual: usize,
    },

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The safe border needed for the intensity range cannot be allocated.
    #[error("Safe border for an intensity range of {range} on axis {axis} is too large")]
    BorderTooLarge {
        /// The axis whose padding is too large.
        axis: usize,
        /// The intensity range of the image.
        range: f64,
    },

    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the execution strategy.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
