//! Differencing utilities for ARIMA models.

use crate::utils::stats::variance;

/// Apply differencing `d` times.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order
///
/// # Returns
/// The differenced series, `d` values shorter.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Suggest a differencing order (0, 1 or 2) with a variance-ratio test.
///
/// Each further difference must shrink the variance by at least 10%.
pub fn suggest_differencing(series: &[f64]) -> usize {
    if series.len() < 3 {
        return 0;
    }

    let var_0 = variance(series);
    let diff_1 = difference(series, 1);
    if diff_1.len() < 2 {
        return 0;
    }
    let var_1 = variance(&diff_1);

    if !(var_0 > 0.0 && var_1 / var_0 < 0.9) {
        return 0;
    }

    let diff_2 = difference(&diff_1, 1);
    if diff_2.len() >= 2 {
        let var_2 = variance(&diff_2);
        if var_2 / var_1 < 0.9 && var_2 < var_0 {
            return 2;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_orders() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 0), series);
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn suggest_differencing_stationary() {
        let series = vec![1.0, 0.5, 1.2, 0.8, 1.1, 0.9, 1.0, 1.1];
        assert_eq!(suggest_differencing(&series), 0);
    }

    #[test]
    fn suggest_differencing_trend() {
        let series: Vec<f64> = (0..20).map(|i| 10.0 + 2.0 * i as f64).collect();
        assert!(suggest_differencing(&series) >= 1);
    }

    #[test]
    fn suggest_differencing_short_series() {
        assert_eq!(suggest_differencing(&[1.0, 2.0]), 0);
    }
}
