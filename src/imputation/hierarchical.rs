//! Fallback to the parent level's finalized values.

use crate::core::{Hierarchy, PriceTable};
use crate::error::{ImputeError, Result};

/// Copy the parent location's same-month value into every remaining gap.
///
/// Rows are joined to `parent` through `hierarchy` on (location, month), and
/// columns on product name. Every lookup is resolved before anything is
/// written, so a missing mapping, row or column leaves `table` untouched. A
/// parent gap propagates as a gap.
///
/// Returns the number of cells filled.
pub fn propagate_from_parent(table: &mut PriceTable, parent: &PriceTable, hierarchy: &Hierarchy) -> Result<usize> {
    let columns = table
        .products()
        .iter()
        .map(|name| parent.require_product(name))
        .collect::<Result<Vec<usize>>>()?;

    let mut writes = Vec::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let gaps: Vec<usize> = (0..columns.len())
            .filter(|&p| row.values()[p].is_none())
            .collect();
        if gaps.is_empty() {
            continue;
        }

        let parent_location = hierarchy.require_parent(row.location())?;
        let parent_row = parent
            .row_index(parent_location, row.month())
            .ok_or_else(|| ImputeError::MissingParentRow {
                child: row.location().to_string(),
                parent: parent_location.to_string(),
                month: row.month(),
            })?;

        for p in gaps {
            if let Some(value) = parent.cell(parent_row, columns[p]) {
                writes.push((row_idx, p, value));
            }
        }
    }

    let filled = writes
        .into_iter()
        .filter(|&(row, p, value)| table.fill_cell(row, p, value))
        .count();
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AdminLevel, YearMonth};

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn region() -> PriceTable {
        // Columns in a different order than the child table.
        let mut table = PriceTable::new(AdminLevel::Region, vec!["rice", "bread"]).unwrap();
        table.push_row("Aleppo", ym("2020-01"), vec![Some(10.0), Some(1.5)]).unwrap();
        table.push_row("Aleppo", ym("2020-02"), vec![None, Some(1.6)]).unwrap();
        table.push_row("Homs", ym("2020-01"), vec![Some(11.0), Some(1.4)]).unwrap();
        table
    }

    fn hierarchy() -> Hierarchy {
        Hierarchy::from_pairs([("Jebel Saman", "Aleppo"), ("Al Makhrim", "Homs")])
    }

    #[test]
    fn joins_by_location_month_and_product_name() {
        let mut district = PriceTable::new(AdminLevel::District, vec!["bread", "rice"]).unwrap();
        district
            .push_row("Jebel Saman", ym("2020-02"), vec![None, Some(12.0)])
            .unwrap();
        district
            .push_row("Al Makhrim", ym("2020-01"), vec![None, None])
            .unwrap();

        let filled = propagate_from_parent(&mut district, &region(), &hierarchy()).unwrap();
        assert_eq!(filled, 3);
        assert_eq!(district.value("Jebel Saman", ym("2020-02"), 0), Some(Some(1.6)));
        assert_eq!(district.value("Jebel Saman", ym("2020-02"), 1), Some(Some(12.0)));
        assert_eq!(district.value("Al Makhrim", ym("2020-01"), 0), Some(Some(1.4)));
        assert_eq!(district.value("Al Makhrim", ym("2020-01"), 1), Some(Some(11.0)));
    }

    #[test]
    fn parent_gap_propagates_as_gap() {
        let mut district = PriceTable::new(AdminLevel::District, vec!["rice"]).unwrap();
        district.push_row("Jebel Saman", ym("2020-02"), vec![None]).unwrap();
        assert_eq!(propagate_from_parent(&mut district, &region(), &hierarchy()).unwrap(), 0);
        assert_eq!(district.missing_count(), 1);
    }

    #[test]
    fn missing_mapping_is_fatal_and_writes_nothing() {
        let mut district = PriceTable::new(AdminLevel::District, vec!["bread"]).unwrap();
        district.push_row("Jebel Saman", ym("2020-01"), vec![None]).unwrap();
        district.push_row("Unmapped", ym("2020-01"), vec![None]).unwrap();

        let err = propagate_from_parent(&mut district, &region(), &hierarchy()).unwrap_err();
        assert!(matches!(err, ImputeError::MissingParentMapping(ref l) if l == "Unmapped"));
        assert_eq!(district.missing_count(), 2);
    }

    #[test]
    fn missing_parent_row_is_fatal() {
        let mut district = PriceTable::new(AdminLevel::District, vec!["bread"]).unwrap();
        district.push_row("Al Makhrim", ym("2020-02"), vec![None]).unwrap();

        let err = propagate_from_parent(&mut district, &region(), &hierarchy()).unwrap_err();
        assert!(matches!(err, ImputeError::MissingParentRow { ref parent, .. } if parent == "Homs"));
    }

    #[test]
    fn complete_rows_need_no_parent() {
        let mut district = PriceTable::new(AdminLevel::District, vec!["bread"]).unwrap();
        district.push_row("Unmapped", ym("2030-01"), vec![Some(1.0)]).unwrap();
        assert_eq!(propagate_from_parent(&mut district, &region(), &Hierarchy::new()).unwrap(), 0);
    }

    #[test]
    fn product_absent_from_parent() {
        let mut district = PriceTable::new(AdminLevel::District, vec!["sugar"]).unwrap();
        district.push_row("Jebel Saman", ym("2020-01"), vec![Some(1.0)]).unwrap();
        assert!(matches!(
            propagate_from_parent(&mut district, &region(), &hierarchy()),
            Err(ImputeError::MissingProduct(_))
        ));
    }
}
