use paramorph_image::Image;

use crate::error::MorphologyError;
use crate::kernel::MorphMode;
use crate::scale::safe_border_extent;

/// Constant used to pad an image before a composite operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BorderFill {
    /// The image maximum, for openings.
    Max,
    /// The image minimum, for closings.
    Min,
}

impl BorderFill {
    /// The fill matching the first pass of a composite operation, if any.
    pub(crate) fn for_passes<const D: usize>(passes: &[(MorphMode, [f64; D])]) -> Option<Self> {
        match passes {
            [(MorphMode::Erode, _), (MorphMode::Dilate, _)] => Some(BorderFill::Max),
            [(MorphMode::Dilate, _), (MorphMode::Erode, _)] => Some(BorderFill::Min),
            _ => None,
        }
    }
}

/// Per-axis padding wide enough for the widest parabola of all passes.
pub(crate) fn safe_border_padding<const D: usize>(
    range: f64,
    passes: &[(MorphMode, [f64; D])],
) -> Result<[usize; D], MorphologyError> {
    let mut pad = [0; D];
    for (_, curvatures) in passes {
        for (axis, (p, &c)) in pad.iter_mut().zip(curvatures).enumerate() {
            let extent = safe_border_extent(range, c)
                .ok_or(MorphologyError::BorderTooLarge { axis, range })?;
            *p = (*p).max(extent);
        }
    }
    Ok(pad)
}

/// Run `filter` on a padded copy of `image` and crop the result back.
///
/// `filter` receives the padded buffer and its size. Returns the filtered
/// samples on the original grid, or `BorderTooLarge` / `PaddingOverflow` before
/// `filter` runs when the padding cannot be allocated.
pub(crate) fn with_safe_border<const D: usize, F>(
    image: &Image<f64, D>,
    fill: BorderFill,
    passes: &[(MorphMode, [f64; D])],
    filter: F,
) -> Result<Vec<f64>, MorphologyError>
where
    F: FnOnce(&mut [f64], [usize; D]) -> Result<(), MorphologyError>,
{
    let Some((lo, hi)) = image.min_max() else {
        let mut data = image.as_slice().to_vec();
        filter(&mut data, image.size())?;
        return Ok(data);
    };

    let pad = safe_border_padding(hi - lo, passes)?;
    if pad.iter().all(|&p| p == 0) {
        let mut data = image.as_slice().to_vec();
        filter(&mut data, image.size())?;
        return Ok(data);
    }

    let value = match fill {
        BorderFill::Max => hi,
        BorderFill::Min => lo,
    };
    log::debug!("safe border: padding {pad:?} with {value}");

    let mut padded = image.pad_constant(pad, value)?;
    let size = padded.size();
    filter(padded.as_slice_mut(), size)?;
    Ok(padded.crop(pad, image.size())?.into_vec())
}
