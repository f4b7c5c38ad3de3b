//! Engine configuration.
//!
//! Every stage reads its settings from an [`ImputationConfig`] passed in
//! explicitly. All fields have defaults, so an empty document is valid.
//!
//! # Example
//!
//! ```toml
//! required_products = ["bread_price", "rice_price"]
//!
//! [local]
//! half_window = 8
//! fine_half_window = 5
//!
//! [geographic]
//! passes = 2
//! neighbor_count = 4
//!
//! [global]
//! degree = 3
//! min_points = 6
//!
//! [refinement]
//! enabled = true
//! min_index = 5
//! criterion = "aic"
//! ```

use crate::models::arima::{AutoARIMAConfig, InformationCriterion};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImputationConfig {
    /// Product columns every input table must carry.
    #[serde(default)]
    pub required_products: Vec<String>,

    #[serde(default)]
    pub local: LocalRegressionConfig,

    #[serde(default)]
    pub geographic: GeographicConfig,

    #[serde(default)]
    pub global: GlobalRegressionConfig,

    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Drop rows with a blank location name before district and
    /// sub-district runs.
    #[serde(default = "default_true")]
    pub drop_blank_locations: bool,
}

impl Default for ImputationConfig {
    fn default() -> Self {
        Self {
            required_products: Vec::new(),
            local: LocalRegressionConfig::default(),
            geographic: GeographicConfig::default(),
            global: GlobalRegressionConfig::default(),
            refinement: RefinementConfig::default(),
            drop_blank_locations: true,
        }
    }
}

impl ImputationConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ImputationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local.half_window == 0 || self.local.fine_half_window == 0 {
            return Err(ConfigError::Validation(
                "local regression half windows must be positive".into(),
            ));
        }
        if self.local.degree > 2 * self.local.fine_half_window.min(self.local.half_window) {
            return Err(ConfigError::Validation(format!(
                "local.degree ({}) is too high for the configured windows",
                self.local.degree
            )));
        }
        if self.geographic.neighbor_count == 0 {
            return Err(ConfigError::Validation(
                "geographic.neighbor_count must be at least 1".into(),
            ));
        }
        if self.global.min_points <= self.global.degree {
            return Err(ConfigError::Validation(format!(
                "global.min_points ({}) must exceed global.degree ({})",
                self.global.min_points, self.global.degree
            )));
        }
        if self.refinement.enabled && self.refinement.min_index == 0 {
            return Err(ConfigError::Validation(
                "refinement.min_index must be at least 1".into(),
            ));
        }
        for (i, name) in self.required_products.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "required product names must not be blank".into(),
                ));
            }
            if self.required_products[..i].contains(name) {
                return Err(ConfigError::Validation(format!(
                    "required product '{name}' listed twice"
                )));
            }
        }
        Ok(())
    }
}

/// Bounded-window polynomial imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalRegressionConfig {
    /// Half window for the single pass (national, region) and the second
    /// pass (district, sub-district).
    #[serde(default = "default_half_window")]
    pub half_window: usize,

    /// Half window of the first, narrower pass at district and sub-district
    /// level.
    #[serde(default = "default_fine_half_window")]
    pub fine_half_window: usize,

    #[serde(default = "default_degree")]
    pub degree: usize,
}

impl Default for LocalRegressionConfig {
    fn default() -> Self {
        Self {
            half_window: default_half_window(),
            fine_half_window: default_fine_half_window(),
            degree: default_degree(),
        }
    }
}

/// Neighbor averaging at region level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeographicConfig {
    #[serde(default = "default_passes")]
    pub passes: usize,

    #[serde(default = "default_neighbor_count")]
    pub neighbor_count: usize,
}

impl Default for GeographicConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
            neighbor_count: default_neighbor_count(),
        }
    }
}

/// Whole-series polynomial fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalRegressionConfig {
    #[serde(default = "default_degree")]
    pub degree: usize,

    /// Fewer known points than this and the series is left alone.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

impl Default for GlobalRegressionConfig {
    fn default() -> Self {
        Self {
            degree: default_degree(),
            min_points: default_min_points(),
        }
    }
}

/// ARIMA refinement of region-level imputations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefinementConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Original gaps before this position are never refined.
    #[serde(default = "default_min_index")]
    pub min_index: usize,

    #[serde(default = "default_max_pq")]
    pub max_p: usize,

    #[serde(default = "default_max_d")]
    pub max_d: usize,

    #[serde(default = "default_max_pq")]
    pub max_q: usize,

    /// Upper bound on `p + q`.
    #[serde(default = "default_max_pq")]
    pub max_order: usize,

    /// Score only the short list of low orders instead of the full grid.
    #[serde(default)]
    pub stepwise: bool,

    #[serde(default)]
    pub criterion: InformationCriterion,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_index: default_min_index(),
            max_p: default_max_pq(),
            max_d: default_max_d(),
            max_q: default_max_pq(),
            max_order: default_max_pq(),
            stepwise: false,
            criterion: InformationCriterion::Aic,
        }
    }
}

impl RefinementConfig {
    /// Non-seasonal order search settings.
    pub fn search_config(&self) -> AutoARIMAConfig {
        AutoARIMAConfig {
            max_p: self.max_p,
            max_d: self.max_d,
            max_q: self.max_q,
            max_order: self.max_order,
            stepwise: self.stepwise,
            criterion: self.criterion,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_half_window() -> usize {
    8
}

fn default_fine_half_window() -> usize {
    5
}

fn default_passes() -> usize {
    2
}

fn default_neighbor_count() -> usize {
    4
}

fn default_degree() -> usize {
    3
}

fn default_min_points() -> usize {
    6
}

fn default_min_index() -> usize {
    5
}

fn default_max_pq() -> usize {
    5
}

fn default_max_d() -> usize {
    2
}
