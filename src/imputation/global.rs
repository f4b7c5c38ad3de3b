//! Whole-series polynomial fallback.

use crate::core::series::{fill_gap, known_points};
use crate::error::{ImputeError, Result};
use crate::utils::polyfit;

/// Fit one polynomial over every known point and fill all remaining gaps.
///
/// Fails with [`ImputeError::InsufficientData`] when fewer than `min_points`
/// values are known; the series is left untouched in that case.
pub fn global_regression(values: &mut [Option<f64>], degree: usize, min_points: usize) -> Result<usize> {
    let (x, y) = known_points(values);
    let needed = min_points.max(degree + 1);
    if x.len() < needed {
        return Err(ImputeError::InsufficientData {
            needed,
            got: x.len(),
        });
    }
    if x.len() == values.len() {
        return Ok(0);
    }

    let poly = polyfit(&x, &y, degree)?;
    let mut filled = 0;
    for (i, slot) in values.iter_mut().enumerate() {
        if slot.is_none() && fill_gap(slot, poly.evaluate(i as f64)) {
            filled += 1;
        }
    }
    Ok(filled)
}
