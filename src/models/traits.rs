//! Interface shared by models used for in-sample gap refinement.

use crate::error::Result;

/// A model that can be fitted on a complete series and queried for its
/// one-step-ahead in-sample predictions.
///
/// This trait is object-safe and can be used with `Box<dyn InSampleModel>`.
pub trait InSampleModel {
    /// Fit the model to a gap-free series.
    fn fit(&mut self, values: &[f64]) -> Result<()>;

    /// One prediction per fitted position, on the scale of the input.
    ///
    /// The prediction at `t` only uses observations before `t`.
    fn in_sample_predictions(&self) -> Result<Vec<f64>>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed model trait objects.
pub type BoxedModel = Box<dyn InSampleModel>;
