#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use paramorph_image as image;

#[doc(inline)]
pub use paramorph_imgproc as imgproc;
