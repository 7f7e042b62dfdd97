#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
/// Error types for the parabolic filters.
pub mod error;

/// one-dimensional parabolic envelope kernels.
pub mod kernel;

/// extraction of the lines of an image along one axis.
pub mod lines;

/// parabolic erosion, dilation, opening, closing and sharpening.
pub mod morphology;

/// module containing parallelization utilities.
pub mod parallel;

/// conversion of scales to parabola curvatures.
pub mod scale;

pub use error::MorphologyError;
