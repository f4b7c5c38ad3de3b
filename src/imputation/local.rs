//! Bounded-window polynomial imputation.

use crate::core::series::{fill_gap, known_points, missing_positions};
use crate::imputation::intervals::gap_intervals;
use crate::utils::polyfit;
use tracing::debug;

/// Polynomial degree of each local fit.
pub const LOCAL_DEGREE: usize = 3;

/// Fill gaps from cubic fits over the windows of [`gap_intervals`].
///
/// Returns the number of cells filled. Gaps outside every accepted window
/// stay missing.
pub fn local_regression(values: &mut [Option<f64>], half_window: usize) -> usize {
    local_regression_with_degree(values, half_window, LOCAL_DEGREE)
}

/// [`local_regression`] with an explicit polynomial degree.
pub fn local_regression_with_degree(
    values: &mut [Option<f64>],
    half_window: usize,
    degree: usize,
) -> usize {
    let missing = missing_positions(values);
    if missing.is_empty() {
        return 0;
    }

    let mut filled = 0;
    for interval in gap_intervals(&missing, values.len(), half_window) {
        let offset = *interval.start();
        let window = &mut values[interval];
        let (x, y) = known_points(window);

        let poly = match polyfit(&x, &y, degree) {
            Ok(poly) => poly,
            Err(e) => {
                debug!(start = offset, error = %e, "skipping local fit");
                continue;
            }
        };

        for (i, slot) in window.iter_mut().enumerate() {
            if slot.is_none() && fill_gap(slot, poly.evaluate(i as f64)) {
                filled += 1;
            }
        }
    }
    filled
}
