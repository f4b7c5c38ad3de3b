//! ARIMA refinement of imputed values.
//!
//! Once a series is gap-free, the values written into its original gaps are
//! replaced by the one-step in-sample predictions of an automatically
//! selected ARIMA model fitted on `ln(v + 1)`.

use crate::config::RefinementConfig;
use crate::core::series::complete_values;
use crate::core::PriceTable;
use crate::error::Result;
use crate::imputation::notices::{NoticeKind, Notices};
use crate::models::arima::AutoARIMA;
use crate::models::InSampleModel;
use tracing::{debug, warn};

/// Refine the values at `original_gaps` of a gap-free series.
///
/// Positions below `config.min_index` or past the end are left alone, as is
/// any position whose back-transformed prediction is not finite. Fails when
/// the model cannot be fitted; `clean` is never modified.
pub fn refine_series(clean: &[f64], original_gaps: &[usize], config: &RefinementConfig) -> Result<Vec<f64>> {
    let targets: Vec<usize> = original_gaps
        .iter()
        .copied()
        .filter(|&t| t >= config.min_index && t < clean.len())
        .collect();
    let mut refined = clean.to_vec();
    if targets.is_empty() {
        return Ok(refined);
    }

    let transformed: Vec<f64> = clean
        .iter()
        .map(|&v| {
            let x = (v + 1.0).ln();
            if x.is_finite() {
                x
            } else {
                0.0
            }
        })
        .collect();

    let mut model = AutoARIMA::with_config(config.search_config());
    model.fit(&transformed)?;
    let predictions = model.in_sample_predictions()?;
    if let Some((p, d, q)) = model.selected_order() {
        debug!(p, d, q, targets = targets.len(), "refinement model selected");
    }

    for t in targets {
        let value = predictions[t].exp() - 1.0;
        if value.is_finite() {
            refined[t] = value;
        }
    }
    Ok(refined)
}

/// Refine every (location, product) series of `table` against the gaps of
/// `original`, the same table as it was before imputation.
///
/// A series that still has gaps, or whose model cannot be fitted, keeps its
/// current values. Returns the number of cells rewritten.
pub fn refine_table(
    table: &mut PriceTable,
    original: &PriceTable,
    config: &RefinementConfig,
    notices: &mut Notices,
) -> Result<usize> {
    let columns = table
        .products()
        .iter()
        .map(|name| original.require_product(name))
        .collect::<Result<Vec<usize>>>()?;

    let mut refined_cells = 0;
    for location in table.locations() {
        let rows = table.series_rows(&location);
        for (product, &original_product) in columns.iter().enumerate() {
            let gaps: Vec<usize> = rows
                .iter()
                .enumerate()
                .filter(|&(_, &row)| {
                    let month = table.rows()[row].month();
                    original.value(&location, month, original_product) == Some(None)
                })
                .map(|(t, _)| t)
                .collect();
            if !gaps.iter().any(|&t| t >= config.min_index) {
                continue;
            }

            let product_name = table.products()[product].clone();
            let Some(clean) = complete_values(&table.column(&rows, product)) else {
                notices.record(NoticeKind::SeriesNotComplete);
                warn!(%location, product = %product_name, "series still has gaps; refinement skipped");
                continue;
            };

            match refine_series(&clean, &gaps, config) {
                Ok(refined) => {
                    for &t in gaps.iter().filter(|&&t| t >= config.min_index) {
                        if refined[t] != clean[t] {
                            refined_cells += 1;
                        }
                        table.set_cell(rows[t], product, Some(refined[t]));
                    }
                }
                Err(e) => {
                    notices.record(NoticeKind::ModelFitFailed);
                    warn!(%location, product = %product_name, error = %e, "refinement failed; imputations kept");
                }
            }
        }
    }

    Ok(refined_cells)
}
