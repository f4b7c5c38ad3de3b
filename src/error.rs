//! Error types for the cascade-impute library.

use crate::config::ConfigError;
use crate::core::{AdminLevel, YearMonth};
use thiserror::Error;

/// Result type alias for imputation operations.
pub type Result<T> = std::result::Result<T, ImputeError>;

/// Errors that can occur while imputing price tables.
#[derive(Error, Debug)]
pub enum ImputeError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// An admin-level tag that does not name one of the four levels.
    #[error("unknown admin level tag '{0}'")]
    UnknownAdminLevel(String),

    /// A product column required by the configuration is absent.
    #[error("required product column '{0}' is absent")]
    MissingProduct(String),

    /// A (location, month) key appears twice in one table.
    #[error("duplicate row for location '{location}' at {month}")]
    DuplicateRow { location: String, month: YearMonth },

    /// A location's months are not one consecutive monthly run.
    #[error("months for location '{location}' are not contiguous after {after}")]
    NonContiguousMonths { location: String, after: YearMonth },

    /// A year-month value that cannot be represented or parsed.
    #[error("invalid month: {0}")]
    InvalidMonth(String),

    /// A child location has no entry in the hierarchy map.
    #[error("location '{0}' has no parent in the hierarchy")]
    MissingParentMapping(String),

    /// The parent table has no row for a month a child needs.
    #[error("parent location '{parent}' has no row at {month} (needed by '{child}')")]
    MissingParentRow {
        child: String,
        parent: String,
        month: YearMonth,
    },

    /// A level was run out of the National → SubDistrict order.
    #[error("admin level {got} cannot run now (expected {expected})")]
    LevelOrder { expected: String, got: AdminLevel },

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ImputeError {
    /// Whether the error reports a data shortfall rather than a defect.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            ImputeError::InsufficientData { .. } | ImputeError::EmptyData
        )
    }
}
