//! Least-squares polynomial fitting.
//!
//! Positions are mapped onto `[-1, 1]` before the Vandermonde normal
//! equations are formed, which keeps the system well conditioned for
//! month indices in the hundreds. The system is solved by Cholesky
//! decomposition.

use crate::error::{ImputeError, Result};

/// A fitted polynomial in a scaled domain.
#[derive(Debug, Clone)]
pub struct Polynomial {
    /// Coefficients in the scaled variable, lowest degree first.
    coefficients: Vec<f64>,
    center: f64,
    half_range: f64,
}

impl Polynomial {
    /// Degree of the fitted polynomial.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate at an (unscaled) position.
    pub fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.half_range;
        // Horner
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }
}

/// Fit `y ≈ p(x)` with `deg(p) = degree` by least squares.
///
/// Needs at least `degree + 1` distinct positions.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial> {
    if x.len() != y.len() {
        return Err(ImputeError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    let num_params = degree + 1;
    if x.len() < num_params {
        return Err(ImputeError::InsufficientData {
            needed: num_params,
            got: x.len(),
        });
    }

    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let center = (lo + hi) / 2.0;
    let half_range = if hi > lo { (hi - lo) / 2.0 } else { 1.0 };

    // X'X and X'y over powers of the scaled position
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];
    let mut powers = vec![0.0; 2 * degree + 1];

    for (&xi, &yi) in x.iter().zip(y) {
        let t = (xi - center) / half_range;
        let mut p = 1.0;
        for power in powers.iter_mut() {
            *power = p;
            p *= t;
        }
        for i in 0..num_params {
            xty[i] += powers[i] * yi;
            for j in 0..num_params {
                xtx[i][j] += powers[i + j];
            }
        }
    }

    let coefficients = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ImputeError::ComputationError(format!(
            "polynomial fit of degree {degree} is singular ({} points)",
            x.len()
        ))
    })?;

    Ok(Polynomial {
        coefficients,
        center,
        half_range,
    })
}

/// Solve `A x = b` for symmetric positive definite `A` via Cholesky.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = a[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                // Relative pivot guard against rank deficiency.
                if sum <= 1e-12 * a[i][i].abs().max(1.0) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum = b[i] - (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = sum / l[i][i];
    }

    // L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = y[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }

    Some(x)
}
