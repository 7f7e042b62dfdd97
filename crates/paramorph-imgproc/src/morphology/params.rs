use serde::{Deserialize, Serialize};

use crate::error::MorphologyError;
use crate::kernel::{MorphMode, ParabolicAlgorithm};
use crate::parallel::ExecutionStrategy;
use crate::scale::validate_scale;

/// Operation computed by a parabolic filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MorphOp {
    /// Parabolic erosion.
    Erode,
    /// Parabolic dilation.
    Dilate,
    /// Erosion followed by dilation at the same scale.
    Open,
    /// Dilation followed by erosion at the same scale.
    Close,
}

impl MorphOp {
    /// The sequence of envelope passes the operation is made of.
    pub fn modes(self) -> &'static [MorphMode] {
        match self {
            MorphOp::Erode => &[MorphMode::Erode],
            MorphOp::Dilate => &[MorphMode::Dilate],
            MorphOp::Open => &[MorphMode::Erode, MorphMode::Dilate],
            MorphOp::Close => &[MorphMode::Dilate, MorphMode::Erode],
        }
    }
}

/// Parameters of a parabolic filter.
///
/// Only `scale` is required when deserializing; every other field has a default.
///
/// # Examples
///
/// ```
/// use paramorph_imgproc::morphology::ParabolicParams;
///
/// let json = r#"{ "scale": [1.0, 2.0], "use_image_spacing": true }"#;
/// let params = ParabolicParams::from_json_str(json).unwrap();
///
/// assert_eq!(params.scale, vec![1.0, 2.0]);
/// assert!(params.use_image_spacing);
/// assert!(!params.safe_border);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParabolicParams {
    /// Scale per axis, in squared physical units when `use_image_spacing` is set and in
    /// squared samples otherwise. Zero leaves the axis unchanged.
    pub scale: Vec<f64>,

    /// Interpret the scale in physical units, using the image spacing.
    #[serde(default)]
    pub use_image_spacing: bool,

    /// Optional per-axis switch; a disabled axis is skipped as if its scale were zero.
    #[serde(default)]
    pub enabled_axes: Option<Vec<bool>>,

    /// Line algorithm.
    #[serde(default)]
    pub algorithm: ParabolicAlgorithm,

    /// How lines are scheduled.
    #[serde(default)]
    pub strategy: ExecutionStrategy,

    /// Pad the image before opening or closing so the border cannot bias the result.
    #[serde(default)]
    pub safe_border: bool,
}

impl ParabolicParams {
    /// Parameters with the given scale per axis and default options.
    pub fn new(scale: impl Into<Vec<f64>>) -> Self {
        Self {
            scale: scale.into(),
            use_image_spacing: false,
            enabled_axes: None,
            algorithm: ParabolicAlgorithm::default(),
            strategy: ExecutionStrategy::default(),
            safe_border: false,
        }
    }

    /// Parameters with the same scale on each of `dimension` axes.
    pub fn uniform(scale: f64, dimension: usize) -> Self {
        Self::new(vec![scale; dimension])
    }

    /// Set whether the scale is in physical units.
    pub fn with_image_spacing(mut self, use_image_spacing: bool) -> Self {
        self.use_image_spacing = use_image_spacing;
        self
    }

    /// Restrict processing to the axes flagged `true`.
    pub fn with_enabled_axes(mut self, enabled_axes: impl Into<Vec<bool>>) -> Self {
        self.enabled_axes = Some(enabled_axes.into());
        self
    }

    /// Set the line algorithm.
    pub fn with_algorithm(mut self, algorithm: ParabolicAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set safe-border padding for opening and closing.
    pub fn with_safe_border(mut self, safe_border: bool) -> Self {
        self.safe_border = safe_border;
        self
    }

    /// Number of axes the parameters are configured for.
    pub fn dimension(&self) -> usize {
        self.scale.len()
    }

    /// Check the parameters independently of any image.
    ///
    /// # Errors
    ///
    /// `InvalidScale` for a negative or non-finite scale, `DimensionMismatch` when the
    /// enabled-axes mask has the wrong length, `Parallel` for an invalid strategy.
    pub fn validate(&self) -> Result<(), MorphologyError> {
        validate_scale(&self.scale, self.dimension())?;
        if let Some(enabled) = &self.enabled_axes {
            if enabled.len() != self.dimension() {
                return Err(MorphologyError::DimensionMismatch {
                    expected: self.dimension(),
                    actual: enabled.len(),
                });
            }
        }
        self.strategy.validate()?;
        Ok(())
    }

    /// Parse and validate parameters from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, MorphologyError> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| MorphologyError::InvalidConfig(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize the parameters to JSON.
    pub fn to_json_string(&self) -> Result<String, MorphologyError> {
        serde_json::to_string(self).map_err(|e| MorphologyError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        assert_eq!(MorphOp::Open.modes(), &[MorphMode::Erode, MorphMode::Dilate]);
        assert_eq!(MorphOp::Close.modes(), &[MorphMode::Dilate, MorphMode::Erode]);
    }

    #[test]
    fn test_builder() {
        let params = ParabolicParams::uniform(2.0, 3)
            .with_image_spacing(true)
            .with_enabled_axes([true, false, true])
            .with_algorithm(ParabolicAlgorithm::ContactPoint)
            .with_strategy(ExecutionStrategy::Serial)
            .with_safe_border(true);
        assert_eq!(params.scale, vec![2.0; 3]);
        assert_eq!(params.enabled_axes, Some(vec![true, false, true]));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            ParabolicParams::new([1.0, -2.0]).validate(),
            Err(MorphologyError::InvalidScale(1, -2.0))
        );
        assert_eq!(
            ParabolicParams::new([1.0, 2.0])
                .with_enabled_axes([true])
                .validate(),
            Err(MorphologyError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            ParabolicParams::new([1.0])
                .with_strategy(ExecutionStrategy::Fixed(0))
                .validate(),
            Err(MorphologyError::Parallel(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() -> Result<(), MorphologyError> {
        let params = ParabolicParams::new([0.5, 1.5])
            .with_algorithm(ParabolicAlgorithm::Intersection)
            .with_strategy(ExecutionStrategy::Fixed(4));
        let json = params.to_json_string()?;
        assert_eq!(ParabolicParams::from_json_str(&json)?, params);
        Ok(())
    }

    #[test]
    fn test_json_defaults_and_errors() -> Result<(), MorphologyError> {
        let params = ParabolicParams::from_json_str(
            r#"{ "scale": [1.0], "algorithm": "ContactPoint", "strategy": { "Fixed": 2 } }"#,
        )?;
        assert_eq!(params.algorithm, ParabolicAlgorithm::ContactPoint);
        assert_eq!(params.strategy, ExecutionStrategy::Fixed(2));
        assert_eq!(params.enabled_axes, None);

        assert!(matches!(
            ParabolicParams::from_json_str(r#"{ "use_image_spacing": true }"#),
            Err(MorphologyError::InvalidConfig(_))
        ));
        assert_eq!(
            ParabolicParams::from_json_str(r#"{ "scale": [-1.0] }"#),
            Err(MorphologyError::InvalidScale(0, -1.0))
        );
        Ok(())
    }
}
