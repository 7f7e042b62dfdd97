//! Conversion from user scales to parabola curvatures.
//!
//! A scale `t` on an axis with sample spacing `h` gives the structuring function
//! `x² / (2t)` in physical coordinates `x = h·i`, that is `c·i²` in sample
//! coordinates with
//!
//! ```text
//! c = h² / (2t)
//! ```
//!
//! `t` therefore has units of squared length. When image spacing is ignored,
//! `h = 1` and `t` is in squared samples. `t = 0` gives an infinite curvature,
//! which the kernel treats as the identity.

use crate::error::MorphologyError;

/// Curvature coefficient of the parabola for one axis.
///
/// Larger scales widen the parabola; coarser spacing raises the curvature so the
/// physical-space result does not depend on the sampling. A zero scale returns
/// `f64::INFINITY`.
///
/// # Examples
///
/// ```
/// use paramorph_imgproc::scale::to_curvature;
///
/// assert_eq!(to_curvature(1.0, 1.0), 0.5);
/// assert_eq!(to_curvature(2.0, 2.0), 1.0);
/// assert!(to_curvature(0.0, 1.0).is_infinite());
/// ```
pub fn to_curvature(scale: f64, spacing: f64) -> f64 {
    if scale == 0.0 {
        return f64::INFINITY;
    }
    (spacing * spacing) / (2.0 * scale)
}

/// Check one scale vector against the configured dimension.
pub fn validate_scale(scale: &[f64], dimension: usize) -> Result<(), MorphologyError> {
    if scale.len() != dimension {
        return Err(MorphologyError::DimensionMismatch {
            expected: dimension,
            actual: scale.len(),
        });
    }
    for (axis, &s) in scale.iter().enumerate() {
        if !s.is_finite() || s < 0.0 {
            return Err(MorphologyError::InvalidScale(axis, s));
        }
    }
    Ok(())
}

/// Convert a scale vector to one curvature per axis.
///
/// Disabled axes get an infinite curvature, the same as a zero scale.
///
/// # Arguments
///
/// * `scale` - Scale per axis, finite and non-negative.
/// * `spacing` - Image spacing per axis.
/// * `use_image_spacing` - Whether the scale is in physical units.
/// * `enabled_axes` - Optional per-axis switch.
///
/// # Errors
///
/// `DimensionMismatch` if `scale` or `enabled_axes` do not have `D` entries,
/// `InvalidScale` if a component is negative or not finite.
pub fn axis_curvatures<const D: usize>(
    scale: &[f64],
    spacing: &[f64; D],
    use_image_spacing: bool,
    enabled_axes: Option<&[bool]>,
) -> Result<[f64; D], MorphologyError> {
    validate_scale(scale, D)?;
    if let Some(enabled) = enabled_axes {
        if enabled.len() != D {
            return Err(MorphologyError::DimensionMismatch {
                expected: D,
                actual: enabled.len(),
            });
        }
    }

    let mut curvatures = [f64::INFINITY; D];
    for (axis, c) in curvatures.iter_mut().enumerate() {
        if enabled_axes.is_some_and(|enabled| !enabled[axis]) {
            continue;
        }
        let h = if use_image_spacing { spacing[axis] } else { 1.0 };
        *c = to_curvature(scale[axis], h);
    }
    Ok(curvatures)
}

/// Number of samples a border must extend so that a parabola of curvature `c`
/// climbing over an intensity `range` cannot reach back into the image.
///
/// Zero for identity axes and flat images. `None` when the extent is not a finite
/// number of samples that fits in a `usize`, e.g. for an infinite range.
pub fn safe_border_extent(range: f64, curvature: f64) -> Option<usize> {
    if !curvature.is_finite() || curvature <= 0.0 || !(range > 0.0) {
        return Some(0);
    }
    let extent = (range / curvature).sqrt().ceil();
    (extent < usize::MAX as f64).then_some(extent as usize)
}
