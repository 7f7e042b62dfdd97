use num_traits::NumCast;

/// Trait for the scalar sample types an image can hold.
///
/// Filters compute in `f64` and convert back once when the output is written.
/// Integer conversions round to the nearest value and saturate at the type bounds;
/// `NaN` maps to zero.
pub trait Pixel: Copy + Default + PartialOrd + Send + Sync + 'static {
    /// Convert the sample to `f64`.
    fn to_f64(self) -> f64;

    /// Convert a `f64` value to the sample type.
    fn from_f64(value: f64) -> Self;
}

impl Pixel for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Pixel for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

macro_rules! impl_pixel_int {
    ($($t:ty),*) => {
        $(
            impl Pixel for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    let clamped = value.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64);
                    <$t as NumCast>::from(clamped).unwrap_or_default()
                }
            }
        )*
    };
}

impl_pixel_int!(u8, u16, u32, i8, i16, i32);
