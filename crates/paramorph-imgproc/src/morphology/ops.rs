use paramorph_image::{Image, Pixel};

use super::border::{with_safe_border, BorderFill};
use super::params::{MorphOp, ParabolicParams};
use super::separable::parabolic_passes;
use super::sharpen::sharpen_step;
use crate::error::MorphologyError;
use crate::kernel::MorphMode;
use crate::parallel::CancellationToken;
use crate::scale::axis_curvatures;

/// A validated, reusable parabolic filter.
///
/// # Examples
///
/// ```
/// use paramorph_image::Image;
/// use paramorph_imgproc::morphology::{MorphOp, ParabolicFilter, ParabolicParams};
///
/// let image = Image::<u8, 2>::new([3, 3], vec![0, 0, 0, 0, 9, 0, 0, 0, 0]).unwrap();
/// let filter = ParabolicFilter::new(ParabolicParams::uniform(1.0, 2)).unwrap();
///
/// let dilated = filter.apply(&image, MorphOp::Dilate).unwrap();
/// assert_eq!(dilated.as_slice(), &[8, 9, 8, 9, 9, 9, 8, 9, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct ParabolicFilter {
    params: ParabolicParams,
    cancel: Option<CancellationToken>,
}

impl ParabolicFilter {
    /// Create a filter from validated parameters.
    ///
    /// # Errors
    ///
    /// Any error reported by [`ParabolicParams::validate`].
    pub fn new(params: ParabolicParams) -> Result<Self, MorphologyError> {
        params.validate()?;
        Ok(Self {
            params,
            cancel: None,
        })
    }

    /// Observe `token` between lines and stop with [`MorphologyError::Cancelled`] once it is set.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The filter parameters.
    pub fn params(&self) -> &ParabolicParams {
        &self.params
    }

    /// Apply `op` to `src`, returning a new image with the same geometry.
    ///
    /// # Arguments
    ///
    /// * `src` - The input image. It is not modified.
    /// * `op` - The operation to compute.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the parameters do not have one entry per image axis,
    /// `Cancelled` if the cancellation token fired. No image is returned on error.
    pub fn apply<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
        op: MorphOp,
    ) -> Result<Image<T, D>, MorphologyError> {
        let curvatures = self.curvatures(&self.params.scale, &src.spacing())?;
        let passes: Vec<(MorphMode, [f64; D])> =
            op.modes().iter().map(|&mode| (mode, curvatures)).collect();
        log::debug!("{op:?} on {}: curvatures {curvatures:?}", src.geometry());
        self.run(src, &passes)
    }

    /// Parabolic erosion.
    pub fn erode<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
    ) -> Result<Image<T, D>, MorphologyError> {
        self.apply(src, MorphOp::Erode)
    }

    /// Parabolic dilation.
    pub fn dilate<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
    ) -> Result<Image<T, D>, MorphologyError> {
        self.apply(src, MorphOp::Dilate)
    }

    /// Parabolic opening, erosion followed by dilation.
    pub fn open<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
    ) -> Result<Image<T, D>, MorphologyError> {
        self.apply(src, MorphOp::Open)
    }

    /// Parabolic closing, dilation followed by erosion.
    pub fn close<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
    ) -> Result<Image<T, D>, MorphologyError> {
        self.apply(src, MorphOp::Close)
    }

    /// Opening with distinct erosion and dilation scales.
    ///
    /// The filter's own scale is not used; every other parameter is.
    pub fn open_with_scales<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
        erode_scale: &[f64],
        dilate_scale: &[f64],
    ) -> Result<Image<T, D>, MorphologyError> {
        let erode_c = self.curvatures(erode_scale, &src.spacing())?;
        let dilate_c = self.curvatures(dilate_scale, &src.spacing())?;
        log::debug!("Open on {}: curvatures {erode_c:?} then {dilate_c:?}", src.geometry());
        self.run(src, &[(MorphMode::Erode, erode_c), (MorphMode::Dilate, dilate_c)])
    }

    /// Closing with distinct dilation and erosion scales.
    ///
    /// The filter's own scale is not used; every other parameter is.
    pub fn close_with_scales<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
        dilate_scale: &[f64],
        erode_scale: &[f64],
    ) -> Result<Image<T, D>, MorphologyError> {
        let dilate_c = self.curvatures(dilate_scale, &src.spacing())?;
        let erode_c = self.curvatures(erode_scale, &src.spacing())?;
        log::debug!("Close on {}: curvatures {dilate_c:?} then {erode_c:?}", src.geometry());
        self.run(src, &[(MorphMode::Dilate, dilate_c), (MorphMode::Erode, erode_c)])
    }

    /// Morphological sharpening.
    ///
    /// Each iteration moves every sample to whichever of its dilation and erosion
    /// is closer, leaving ties unchanged. Zero iterations return a copy of `src`.
    pub fn sharpen<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
        iterations: usize,
    ) -> Result<Image<T, D>, MorphologyError> {
        let curvatures = self.curvatures(&self.params.scale, &src.spacing())?;
        log::debug!(
            "Sharpen on {}: {iterations} iterations, curvatures {curvatures:?}",
            src.geometry()
        );

        let mut x: Image<f64, D> = src.cast();
        if iterations == 0 {
            return Ok(x.cast());
        }

        let parallel = self.params.strategy.is_parallel(src.numel());
        let size = src.size();
        self.params.strategy.install(|| {
            let mut lines = Vec::new();
            for _ in 0..iterations {
                let mut dilated = x.as_slice().to_vec();
                let mut eroded = x.as_slice().to_vec();
                for (buf, mode) in [
                    (&mut dilated, MorphMode::Dilate),
                    (&mut eroded, MorphMode::Erode),
                ] {
                    self.passes(buf, &mut lines, size, &curvatures, mode, parallel)?;
                }
                sharpen_step(x.as_slice_mut(), &dilated, &eroded);
            }
            Ok::<(), MorphologyError>(())
        })??;

        Ok(x.cast())
    }

    fn curvatures<const D: usize>(
        &self,
        scale: &[f64],
        spacing: &[f64; D],
    ) -> Result<[f64; D], MorphologyError> {
        axis_curvatures(
            scale,
            spacing,
            self.params.use_image_spacing,
            self.params.enabled_axes.as_deref(),
        )
    }

    fn passes<const D: usize>(
        &self,
        work: &mut [f64],
        lines: &mut Vec<f64>,
        size: [usize; D],
        curvatures: &[f64; D],
        mode: MorphMode,
        parallel: bool,
    ) -> Result<(), MorphologyError> {
        parabolic_passes(
            work,
            lines,
            size,
            curvatures,
            mode,
            self.params.algorithm,
            parallel,
            self.cancel.as_ref(),
        )
    }

    /// Run a sequence of passes on an `f64` copy of `src` and cast back once.
    fn run<T: Pixel, const D: usize>(
        &self,
        src: &Image<T, D>,
        passes: &[(MorphMode, [f64; D])],
    ) -> Result<Image<T, D>, MorphologyError> {
        let parallel = self.params.strategy.is_parallel(src.numel());
        let work: Image<f64, D> = src.cast();

        let filtered = self.params.strategy.install(|| {
            let run_all = |data: &mut [f64], size: [usize; D]| {
                let mut lines = Vec::new();
                for (mode, curvatures) in passes {
                    self.passes(data, &mut lines, size, curvatures, *mode, parallel)?;
                }
                Ok::<(), MorphologyError>(())
            };

            match BorderFill::for_passes(passes) {
                Some(fill) if self.params.safe_border => {
                    with_safe_border(&work, fill, passes, run_all)
                }
                _ => {
                    let mut data = work.as_slice().to_vec();
                    run_all(&mut data, work.size())?;
                    Ok(data)
                }
            }
        })??;

        let data = filtered.into_iter().map(T::from_f64).collect();
        Ok(Image::from_geometry(*src.geometry(), data)?)
    }
}

/// Apply `op` to `src` with the given parameters.
///
/// # Errors
///
/// Configuration errors are reported before any sample is processed.
pub fn apply<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    params: &ParabolicParams,
    op: MorphOp,
) -> Result<Image<T, D>, MorphologyError> {
    ParabolicFilter::new(params.clone())?.apply(src, op)
}

/// Parabolic erosion with a scale per axis and default options.
///
/// # Examples
///
/// ```
/// use paramorph_image::Image;
/// use paramorph_imgproc::morphology::erode;
///
/// let image = Image::<f32, 1>::new([5], vec![4.0, 4.0, 0.0, 4.0, 4.0]).unwrap();
/// // scale 0.5 gives c = 1
/// let eroded = erode(&image, &[0.5]).unwrap();
///
/// assert_eq!(eroded.as_slice(), &[4.0, 1.0, 0.0, 1.0, 4.0]);
/// ```
pub fn erode<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    scale: &[f64],
) -> Result<Image<T, D>, MorphologyError> {
    apply(src, &ParabolicParams::new(scale), MorphOp::Erode)
}

/// Parabolic dilation with a scale per axis and default options.
pub fn dilate<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    scale: &[f64],
) -> Result<Image<T, D>, MorphologyError> {
    apply(src, &ParabolicParams::new(scale), MorphOp::Dilate)
}

/// Parabolic opening with a scale per axis and default options.
pub fn open<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    scale: &[f64],
) -> Result<Image<T, D>, MorphologyError> {
    apply(src, &ParabolicParams::new(scale), MorphOp::Open)
}

/// Parabolic closing with a scale per axis and default options.
pub fn close<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    scale: &[f64],
) -> Result<Image<T, D>, MorphologyError> {
    apply(src, &ParabolicParams::new(scale), MorphOp::Close)
}

/// Opening with an erosion scale and a different dilation scale.
pub fn open_with_scales<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    erode_scale: &[f64],
    dilate_scale: &[f64],
) -> Result<Image<T, D>, MorphologyError> {
    ParabolicFilter::new(ParabolicParams::new(erode_scale))?.open_with_scales(
        src,
        erode_scale,
        dilate_scale,
    )
}

/// Closing with a dilation scale and a different erosion scale.
pub fn close_with_scales<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    dilate_scale: &[f64],
    erode_scale: &[f64],
) -> Result<Image<T, D>, MorphologyError> {
    ParabolicFilter::new(ParabolicParams::new(dilate_scale))?.close_with_scales(
        src,
        dilate_scale,
        erode_scale,
    )
}

/// Morphological sharpening with a scale per axis and default options.
pub fn sharpen<T: Pixel, const D: usize>(
    src: &Image<T, D>,
    scale: &[f64],
    iterations: usize,
) -> Result<Image<T, D>, MorphologyError> {
    ParabolicFilter::new(ParabolicParams::new(scale))?.sharpen(src, iterations)
}
