//! ARIMA (Autoregressive Integrated Moving Average) model.

use crate::error::{ImputeError, Result};
use crate::models::arima::diff::difference;
use crate::models::InSampleModel;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// ARIMA model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ARIMASpec {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Total number of estimated parameters (AR + MA + intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }

    /// Shortest series the specification can be fitted on.
    pub fn min_len(&self) -> usize {
        self.d + self.p.max(self.q) + 2
    }
}

/// ARIMA(p, d, q) estimated by conditional sum of squares.
#[derive(Debug, Clone)]
pub struct ARIMA {
    spec: ARIMASpec,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    /// Mean of the differenced series.
    intercept: f64,
    /// Series the model was fitted on.
    original: Option<Vec<f64>>,
    /// One-step fitted values on the differenced scale.
    fitted_diff: Option<Vec<f64>>,
    /// Residuals on the differenced scale.
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
}

impl ARIMA {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q))
    }

    pub fn from_spec(spec: ARIMASpec) -> Self {
        Self {
            spec,
            ar_coefficients: vec![],
            ma_coefficients: vec![],
            intercept: 0.0,
            original: None,
            fitted_diff: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            bic: None,
        }
    }

    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    /// Fitted values on the differenced scale.
    pub fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted_diff.as_deref()
    }

    /// Residuals on the differenced scale.
    pub fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    /// One-step prediction for position `t` given lags, using only lags that
    /// exist.
    fn one_step(&self, diff_series: &[f64], residuals: &[f64], t: usize) -> f64 {
        let lagged = |i: usize| t.checked_sub(1 + i);
        let ar: f64 = (0..self.spec.p)
            .filter_map(|i| lagged(i).map(|j| self.ar_coefficients[i] * (diff_series[j] - self.intercept)))
            .sum();
        let ma: f64 = (0..self.spec.q)
            .filter_map(|i| lagged(i).map(|j| self.ma_coefficients[i] * residuals[j]))
            .sum();
        self.intercept + ar + ma
    }

    /// Conditional sum of squares for a candidate parameter vector.
    fn calculate_css(diff_series: &[f64], p: usize, q: usize, ar: &[f64], ma: &[f64], intercept: f64) -> f64 {
        let n = diff_series.len();
        let start = p.max(q);
        if n <= start {
            return f64::MAX;
        }

        let mut residuals = vec![0.0; n];
        let mut css = 0.0;
        for t in start..n {
            let mut pred = intercept;
            for i in 0..p {
                pred += ar[i] * (diff_series[t - 1 - i] - intercept);
            }
            for i in 0..q {
                pred += ma[i] * residuals[t - 1 - i];
            }
            let error = diff_series[t] - pred;
            residuals[t] = error;
            css += error * error;
        }
        css
    }

    fn estimate_parameters(&mut self, diff_series: &[f64]) {
        let (p, q) = (self.spec.p, self.spec.q);
        let mean = diff_series.iter().sum::<f64>() / diff_series.len() as f64;

        if p == 0 && q == 0 {
            self.intercept = mean;
            self.ar_coefficients.clear();
            self.ma_coefficients.clear();
            return;
        }

        // [intercept, ar.., ma..]
        let mut initial = Vec::with_capacity(p + q + 1);
        initial.push(mean);
        initial.extend((0..p).map(|i| 0.1 / (i + 1) as f64));
        initial.extend((0..q).map(|i| 0.1 / (i + 1) as f64));

        // Keep AR stationary and MA invertible.
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

        let result = nelder_mead(
            |params| {
                Self::calculate_css(
                    diff_series,
                    p,
                    q,
                    &params[1..1 + p],
                    &params[1 + p..],
                    params[0],
                )
            },
            &initial,
            Some(&bounds),
            NelderMeadConfig::default(),
        );

        self.intercept = result.optimal_point[0];
        self.ar_coefficients = result.optimal_point[1..1 + p].to_vec();
        self.ma_coefficients = result.optimal_point[1 + p..].to_vec();
    }

    /// Fitted values, residuals and information criteria.
    fn calculate_fitted(&mut self, diff_series: &[f64]) {
        let n = diff_series.len();
        let start = self.spec.p.max(self.spec.q);

        let mut fitted = vec![0.0; n];
        let mut residuals = vec![0.0; n];
        for t in 0..n {
            fitted[t] = self.one_step(diff_series, &residuals, t);
            residuals[t] = diff_series[t] - fitted[t];
        }

        let effective = &residuals[start.min(n)..];
        if !effective.is_empty() {
            // Floored so an exactly fitted (e.g. flat) series keeps finite criteria.
            let variance = (effective.iter().map(|r| r * r).sum::<f64>() / effective.len() as f64)
                .max(f64::EPSILON);
            let n_eff = effective.len() as f64;
            let k = self.spec.num_params() as f64;
            let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());

            self.residual_variance = Some(variance);
            self.aic = Some(-2.0 * ll + 2.0 * k);
            self.bic = Some(-2.0 * ll + k * n_eff.ln());
        }

        self.fitted_diff = Some(fitted);
        self.residuals = Some(residuals);
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl InSampleModel for ARIMA {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        let min_len = self.spec.min_len();
        if values.len() < min_len {
            return Err(ImputeError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ImputeError::InvalidParameter(
                "ARIMA input must be finite".into(),
            ));
        }

        let diff_series = difference(values, self.spec.d);
        self.estimate_parameters(&diff_series);
        self.calculate_fitted(&diff_series);
        self.original = Some(values.to_vec());
        Ok(())
    }

    /// Level-scale one-step predictions.
    ///
    /// Undoing `d` differences of a one-step forecast only needs the observed
    /// lags, so the level prediction at `t` is `y[t]` minus the differenced
    /// residual at `t - d`. The first `d` positions have no prediction and
    /// echo the observation.
    fn in_sample_predictions(&self) -> Result<Vec<f64>> {
        let original = self.original.as_ref().ok_or(ImputeError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ImputeError::FitRequired)?;
        let d = self.spec.d;

        Ok(original
            .iter()
            .enumerate()
            .map(|(t, &y)| match t.checked_sub(d) {
                Some(k) => y - residuals[k],
                None => y,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "ARIMA"
    }

    fn is_fitted(&self) -> bool {
        self.original.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arima_basic_fit() {
        let values: Vec<f64> = (0..50)
            .map(|i| 10.0 + 0.5 * i as f64 + (i as f64 * 0.3).sin())
            .collect();

        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&values).unwrap();

        assert_eq!(model.ar_coefficients().len(), 1);
        assert_eq!(model.ma_coefficients().len(), 1);
        assert!(model.aic().unwrap().is_finite());
        assert!(model.bic().is_some());
    }

    #[test]
    fn arima_ar1_coefficient() {
        let mut values = vec![10.0];
        for i in 1..100 {
            values.push(0.7 * values[i - 1] + (i as f64 * 0.1).sin());
        }
        let mut model = ARIMA::new(1, 0, 0);
        model.fit(&values).unwrap();
        assert!(model.ar_coefficients()[0] > 0.3);
    }

    #[test]
    fn in_sample_predictions_align_with_input() {
        let values: Vec<f64> = (0..40).map(|i| 5.0 + (i as f64 * 0.4).sin()).collect();
        let mut model = ARIMA::new(1, 1, 0);
        model.fit(&values).unwrap();

        let preds = model.in_sample_predictions().unwrap();
        assert_eq!(preds.len(), values.len());
        assert_eq!(preds[0], values[0]);
        assert!(preds.iter().all(|p| p.is_finite()));
        // One-step errors should be far smaller than the signal amplitude.
        let mae: f64 = preds[5..]
            .iter()
            .zip(&values[5..])
            .map(|(p, y)| (p - y).abs())
            .sum::<f64>()
            / 35.0;
        assert!(mae < 0.5);
    }

    #[test]
    fn white_noise_model_predicts_mean() {
        let values = vec![1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0];
        let mut model = ARIMA::new(0, 0, 0);
        model.fit(&values).unwrap();
        assert_relative_eq!(model.intercept(), 2.0, epsilon = 1e-12);
        let preds = model.in_sample_predictions().unwrap();
        for p in preds {
            assert_relative_eq!(p, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn flat_series_has_finite_criteria() {
        let values = vec![4.6; 24];
        let mut model = ARIMA::new(0, 0, 0);
        model.fit(&values).unwrap();
        assert!(model.aic().unwrap().is_finite());
        assert!(model.bic().unwrap().is_finite());
        assert!(model.residual_variance().unwrap() > 0.0);
    }

    #[test]
    fn arima_insufficient_data() {
        let mut model = ARIMA::new(2, 1, 1);
        assert!(matches!(
            model.fit(&[1.0, 2.0, 3.0]),
            Err(ImputeError::InsufficientData { .. })
        ));
    }

    #[test]
    fn arima_rejects_non_finite_input() {
        let mut values = vec![1.0; 20];
        values[4] = f64::NAN;
        let mut model = ARIMA::new(1, 0, 0);
        assert!(matches!(model.fit(&values), Err(ImputeError::InvalidParameter(_))));
    }

    #[test]
    fn arima_requires_fit() {
        let model = ARIMA::default();
        assert!(!model.is_fitted());
        assert!(matches!(
            model.in_sample_predictions(),
            Err(ImputeError::FitRequired)
        ));
    }

    #[test]
    fn arima_spec() {
        let spec = ARIMASpec::new(2, 1, 3);
        assert_eq!(spec.num_params(), 6);
        assert_eq!(spec.min_len(), 6);
        assert_eq!(ARIMA::default().spec(), ARIMASpec::new(1, 1, 1));
        assert_eq!(ARIMA::default().name(), "ARIMA");
    }
}
