//! Automatic non-seasonal ARIMA order selection.

use crate::error::{ImputeError, Result};
use crate::models::arima::diff::suggest_differencing;
use crate::models::arima::model::{ARIMASpec, ARIMA};
use crate::models::InSampleModel;
use serde::{Deserialize, Serialize};

/// Information criterion minimized by the order search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Bic,
}

/// Configuration for AutoARIMA.
#[derive(Debug, Clone)]
pub struct AutoARIMAConfig {
    /// Maximum AR order to consider.
    pub max_p: usize,
    /// Maximum differencing order.
    pub max_d: usize,
    /// Maximum MA order to consider.
    pub max_q: usize,
    /// Maximum `p + q`.
    pub max_order: usize,
    /// Try the low orders up to `(2, 2)` instead of the full grid.
    pub stepwise: bool,
    pub criterion: InformationCriterion,
}

impl Default for AutoARIMAConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_d: 2,
            max_q: 5,
            max_order: 5,
            stepwise: false,
            criterion: InformationCriterion::Aic,
        }
    }
}

impl AutoARIMAConfig {
    /// Set maximum orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    pub fn with_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Use the short stepwise candidate list.
    pub fn stepwise(mut self) -> Self {
        self.stepwise = true;
        self
    }
}

/// Automatic ARIMA model selection.
///
/// The differencing order is chosen first with a variance-ratio test; the
/// AR and MA orders are then chosen by minimizing the configured
/// information criterion over all admissible `(p, q)` pairs, or over the
/// stepwise short list.
#[derive(Debug, Clone, Default)]
pub struct AutoARIMA {
    config: AutoARIMAConfig,
    selected: Option<ARIMA>,
    /// Every successfully fitted order with its score, best first.
    model_scores: Vec<(ARIMASpec, f64)>,
}

impl AutoARIMA {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AutoARIMAConfig) -> Self {
        Self {
            config,
            selected: None,
            model_scores: Vec::new(),
        }
    }

    /// The selected `(p, d, q)`.
    pub fn selected_order(&self) -> Option<(usize, usize, usize)> {
        self.selected.as_ref().map(|m| {
            let spec = m.spec();
            (spec.p, spec.d, spec.q)
        })
    }

    pub fn selected_model(&self) -> Option<&ARIMA> {
        self.selected.as_ref()
    }

    pub fn model_scores(&self) -> &[(ARIMASpec, f64)] {
        &self.model_scores
    }

    fn candidates(&self, d: usize) -> Vec<ARIMASpec> {
        let cfg = &self.config;
        let admissible = |p: usize, q: usize| p <= cfg.max_p && q <= cfg.max_q && p + q <= cfg.max_order;

        if cfg.stepwise {
            [(0, 0), (1, 0), (0, 1), (1, 1), (2, 0), (0, 2), (2, 1), (1, 2), (2, 2)]
                .into_iter()
                .filter(|&(p, q)| admissible(p, q))
                .map(|(p, q)| ARIMASpec::new(p, d, q))
                .collect()
        } else {
            (0..=cfg.max_p)
                .flat_map(|p| (0..=cfg.max_q).map(move |q| (p, q)))
                .filter(|&(p, q)| admissible(p, q))
                .map(|(p, q)| ARIMASpec::new(p, d, q))
                .collect()
        }
    }

    fn score(&self, model: &ARIMA) -> Option<f64> {
        match self.config.criterion {
            InformationCriterion::Aic => model.aic(),
            InformationCriterion::Bic => model.bic(),
        }
    }
}

impl InSampleModel for AutoARIMA {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        const MIN_REQUIRED: usize = 10;
        if values.len() < MIN_REQUIRED {
            return Err(ImputeError::InsufficientData {
                needed: MIN_REQUIRED,
                got: values.len(),
            });
        }

        let d = suggest_differencing(values).min(self.config.max_d);

        self.model_scores.clear();
        self.selected = None;
        let mut best_score = f64::INFINITY;

        for spec in self.candidates(d) {
            if values.len() < spec.d + spec.p.max(spec.q) + 5 {
                continue;
            }
            let mut model = ARIMA::from_spec(spec);
            if model.fit(values).is_err() {
                continue;
            }
            let Some(score) = self.score(&model).filter(|s| s.is_finite()) else {
                continue;
            };
            self.model_scores.push((spec, score));
            if score < best_score {
                best_score = score;
                self.selected = Some(model);
            }
        }

        self.model_scores.sort_by(|a, b| a.1.total_cmp(&b.1));

        if self.selected.is_none() {
            return Err(ImputeError::ComputationError(
                "no ARIMA order could be fitted".to_string(),
            ));
        }
        Ok(())
    }

    fn in_sample_predictions(&self) -> Result<Vec<f64>> {
        self.selected
            .as_ref()
            .ok_or(ImputeError::FitRequired)?
            .in_sample_predictions()
    }

    fn name(&self) -> &str {
        "AutoARIMA"
    }

    fn is_fitted(&self) -> bool {
        self.selected.is_some()
    }
}
