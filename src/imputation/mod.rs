//! Gap-filling stages.
//!
//! Each stage mutates a series or a table in place and only ever writes into
//! gaps, except refinement, which rewrites the values previously imputed
//! into the original gaps of a now complete series.
//!
//! - [`local_regression`]: cubic fits over bounded windows around gaps
//! - [`geographic_impute`]: mean of nearest neighbors in the same month
//! - [`global_regression`]: one polynomial over the whole series
//! - [`propagate_from_parent`]: parent location's finalized value
//! - [`refine_table`]: ARIMA in-sample predictions at original gaps

mod geographic;
mod global;
mod hierarchical;
mod intervals;
mod local;
mod notices;
mod refine;

pub use geographic::geographic_impute;
pub use global::global_regression;
pub use hierarchical::propagate_from_parent;
pub use intervals::gap_intervals;
pub use local::{local_regression, local_regression_with_degree, LOCAL_DEGREE};
pub use notices::{NoticeKind, Notices};
pub use refine::{refine_series, refine_table};
