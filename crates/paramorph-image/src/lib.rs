#![deny(missing_docs)]
//! N-dimensional image types with physical geometry.
//!
//! An [`Image`] owns its samples in row-major order together with an
//! [`ImageGeometry`] (size, spacing and origin per axis). The dimension is a
//! const generic, so a 2-D slice and a 3-D volume are distinct types.
//!
//! ```rust
//! use paramorph_image::{Image, ImageGeometry};
//!
//! let geometry = ImageGeometry::new([4, 4, 2]).with_spacing([1.0, 1.0, 2.5]).unwrap();
//! let volume = Image::<u16, 3>::from_geometry_val(geometry, 0).unwrap();
//!
//! assert_eq!(volume.spacing(), [1.0, 1.0, 2.5]);
//! assert_eq!(volume.numel(), 32);
//! ```

/// Error types for the image module.
pub mod error;

/// image representation for N-dimensional scalar data.
pub mod image;

/// sample type conversions.
pub mod pixel;

pub use crate::error::ImageError;
pub use crate::image::{get_strides_from_shape, Image, ImageGeometry};
pub use crate::pixel::Pixel;
