/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidShape(usize, usize),

    /// Error when the spacing of an axis is not finite or not positive.
    #[error("Invalid spacing {1} on axis {0}: spacing must be finite and positive")]
    InvalidSpacing(usize, f64),

    /// Error when the origin of an axis is not finite.
    #[error("Invalid origin {1} on axis {0}: origin must be finite")]
    InvalidOrigin(usize, f64),

    /// Error when a pixel index is out of bounds.
    #[error("Pixel index {0:?} is out of bounds for image size {1:?}")]
    IndexOutOfBounds(Vec<usize>, Vec<usize>),

    /// Error when a crop region does not fit inside the image.
    #[error("Crop of {size} samples at {lower} exceeds the extent {extent} of axis {axis}")]
    InvalidCrop {
        /// The axis along which the crop failed.
        axis: usize,
        /// The first sample of the crop along the axis.
        lower: usize,
        /// The number of samples requested along the axis.
        size: usize,
        /// The size of the image along the axis.
        extent: usize,
    },

    /// Error when padding grows an axis or the whole image past what can be allocated.
    #[error("Padding of {pad} samples on axis {axis} overflows the image size (extent {extent})")]
    PaddingOverflow {
        /// The axis whose padding overflowed.
        axis: usize,
        /// The requested padding on each side.
        pad: usize,
        /// The size of the image along the axis.
        extent: usize,
    },
}
