//! Helpers over partially observed series (`&[Option<f64>]`).
//!
//! A position holding `None` is a gap. Numeric zero is an observation like
//! any other.

/// Positions of all gaps, ascending.
pub fn missing_positions(values: &[Option<f64>]) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.is_none().then_some(i))
        .collect()
}

/// Number of gaps.
pub fn missing_count(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.is_none()).count()
}

/// Known `(position, value)` pairs as parallel vectors.
pub fn known_points(values: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
        .unzip()
}

/// Write an imputed value into a gap.
///
/// Non-finite values are rejected and leave the slot untouched. Returns
/// whether the slot was filled.
pub fn fill_gap(slot: &mut Option<f64>, value: f64) -> bool {
    if slot.is_some() || !value.is_finite() {
        return false;
    }
    *slot = Some(value);
    true
}

/// Fully observed copy of the series, or `None` if any gap remains.
pub fn complete_values(values: &[Option<f64>]) -> Option<Vec<f64>> {
    values.iter().copied().collect()
}
