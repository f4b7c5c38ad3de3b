//! Neighbor averaging across locations of the same month.

use crate::core::PriceTable;
use crate::geo::NeighborGraph;
use crate::imputation::notices::{NoticeKind, Notices};
use crate::utils::mean_observed;
use tracing::debug;

/// Fill gaps with the mean of the neighbors' same-month values.
///
/// Each pass scans rows in table order and, within a row, products in
/// column order. A value written earlier in a pass is visible to every later
/// cell of that pass. Neighbors with a gap or without a row for the month
/// are ignored; a cell with no usable neighbor stays missing.
///
/// Returns the number of cells filled over all passes.
pub fn geographic_impute(
    table: &mut PriceTable,
    graph: &NeighborGraph,
    passes: usize,
    notices: &mut Notices,
) -> usize {
    let mut filled = 0;

    for pass in 0..passes {
        let mut filled_in_pass = 0;
        for row in 0..table.len() {
            for product in 0..table.products().len() {
                if table.cell(row, product).is_some() {
                    continue;
                }
                let (location, month) = {
                    let r = &table.rows()[row];
                    (r.location(), r.month())
                };
                let neighbors = graph.neighbors(location);
                let average = mean_observed(
                    neighbors
                        .iter()
                        .filter_map(|n| table.value(n, month, product)),
                );
                match average {
                    Some(value) => {
                        if table.fill_cell(row, product, value) {
                            filled_in_pass += 1;
                        }
                    }
                    None => {
                        notices.record(NoticeKind::NoNeighborValues);
                    }
                }
            }
        }
        debug!(pass, filled = filled_in_pass, "geographic pass complete");
        filled += filled_in_pass;
    }

    filled
}
