//! Separable parabolic morphology on N-dimensional images.
//!
//! Every operation runs one 1-D pass per axis, in axis order, on an `f64` copy
//! of the input. The result is cast back to the pixel type once, after the last
//! pass, so openings and closings never round their intermediate.

mod border;
mod ops;
mod params;
mod separable;
mod sharpen;

pub use ops::{
    apply, close, close_with_scales, dilate, erode, open, open_with_scales, sharpen,
    ParabolicFilter,
};
pub use params::{MorphOp, ParabolicParams};
