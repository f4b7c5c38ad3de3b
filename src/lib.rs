//! # cascade-impute
//!
//! Cascading gap imputation for monthly commodity-price series across a
//! nested administrative hierarchy (national → region → district →
//! sub-district).
//!
//! Gaps are closed level by level with windowed polynomial fits,
//! nearest-neighbor averaging, a whole-series polynomial fallback, ARIMA
//! refinement and, below region level, the parent location's finalized
//! values. See [`pipeline::Pipeline`] for the per-level stage order.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod error;
pub mod geo;
pub mod imputation;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use error::{ImputeError, Result};

pub mod prelude {
    pub use crate::config::ImputationConfig;
    pub use crate::core::{AdminLevel, Hierarchy, PriceTable, YearMonth};
    pub use crate::error::{ImputeError, Result};
    pub use crate::geo::{Coordinate, CoordinateTable, NeighborGraph};
    pub use crate::imputation::{NoticeKind, Notices};
    pub use crate::pipeline::{LevelPlan, LevelReport, Pipeline, Stage};
}
