//! Time series models used by the refinement stage.

mod traits;

pub mod arima;

pub use traits::{BoxedModel, InSampleModel};
