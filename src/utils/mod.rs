//! Numerical utilities shared by the imputation stages and models.

pub mod optimization;
pub mod polyfit;
pub mod stats;

pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use polyfit::{polyfit, Polynomial};
pub use stats::{mean, mean_observed, variance};
