//! Price tables keyed by (location, month) with fixed product columns.

use crate::core::hierarchy::AdminLevel;
use crate::core::month::YearMonth;
use crate::core::series::{fill_gap, missing_count};
use crate::error::{ImputeError, Result};
use std::collections::HashMap;

/// One (location, month) row of a price table.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    location: String,
    month: YearMonth,
    values: Vec<Option<f64>>,
}

impl PriceRow {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Cell values in product-column order.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// A price table for one administrative level.
///
/// Rows keep their insertion order, which is the scan order used by the
/// geographic imputer. Every lookup across tables goes through the explicit
/// (location, month) key.
#[derive(Debug, Clone)]
pub struct PriceTable {
    level: AdminLevel,
    products: Vec<String>,
    rows: Vec<PriceRow>,
    index: HashMap<String, HashMap<YearMonth, usize>>,
}

impl PriceTable {
    /// Create an empty table with the given product columns.
    pub fn new<S: Into<String>>(level: AdminLevel, products: Vec<S>) -> Result<Self> {
        let products: Vec<String> = products.into_iter().map(Into::into).collect();
        if products.is_empty() {
            return Err(ImputeError::InvalidParameter(
                "a price table needs at least one product column".into(),
            ));
        }
        for (i, name) in products.iter().enumerate() {
            if products[..i].contains(name) {
                return Err(ImputeError::InvalidParameter(format!(
                    "duplicate product column '{name}'"
                )));
            }
        }
        Ok(Self {
            level,
            products,
            rows: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Append a row. Rejects duplicate keys and wrong column counts.
    pub fn push_row(
        &mut self,
        location: impl Into<String>,
        month: YearMonth,
        values: Vec<Option<f64>>,
    ) -> Result<()> {
        let location = location.into();
        if values.len() != self.products.len() {
            return Err(ImputeError::DimensionMismatch {
                expected: self.products.len(),
                got: values.len(),
            });
        }
        let by_month = self.index.entry(location.clone()).or_default();
        if by_month.contains_key(&month) {
            return Err(ImputeError::DuplicateRow { location, month });
        }
        by_month.insert(month, self.rows.len());
        self.rows.push(PriceRow {
            location,
            month,
            values,
        });
        Ok(())
    }

    /// Build a table from raw observations, averaging every observation that
    /// shares a (location, month) key.
    ///
    /// Each cell is the mean of the finite values observed for that product;
    /// a cell with none stays a gap. Rows follow the first appearance of
    /// their key.
    pub fn from_observations<S, L, I>(level: AdminLevel, products: Vec<S>, records: I) -> Result<Self>
    where
        S: Into<String>,
        L: Into<String>,
        I: IntoIterator<Item = (L, YearMonth, Vec<Option<f64>>)>,
    {
        let mut table = Self::new(level, products)?;
        let width = table.products.len();

        let mut keys: Vec<(String, YearMonth)> = Vec::new();
        let mut sums: Vec<Vec<(f64, usize)>> = Vec::new();
        let mut slots: HashMap<(String, YearMonth), usize> = HashMap::new();

        for (location, month, values) in records {
            if values.len() != width {
                return Err(ImputeError::DimensionMismatch {
                    expected: width,
                    got: values.len(),
                });
            }
            let key = (location.into(), month);
            let slot = match slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    slots.insert(key.clone(), keys.len());
                    keys.push(key);
                    sums.push(vec![(0.0, 0); width]);
                    keys.len() - 1
                }
            };
            for (acc, value) in sums[slot].iter_mut().zip(values) {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    acc.0 += v;
                    acc.1 += 1;
                }
            }
        }

        for ((location, month), acc) in keys.into_iter().zip(sums) {
            let values = acc
                .into_iter()
                .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                .collect();
            table.push_row(location, month, values)?;
        }
        Ok(table)
    }

    pub fn level(&self) -> AdminLevel {
        self.level
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn product_index(&self, product: &str) -> Option<usize> {
        self.products.iter().position(|p| p == product)
    }

    /// Index of a product column, or a configuration error.
    pub fn require_product(&self, product: &str) -> Result<usize> {
        self.product_index(product)
            .ok_or_else(|| ImputeError::MissingProduct(product.to_string()))
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_index(&self, location: &str, month: YearMonth) -> Option<usize> {
        self.index.get(location)?.get(&month).copied()
    }

    /// Cell lookup by key. The outer `None` means the row does not exist;
    /// the inner `None` is a gap.
    pub fn value(&self, location: &str, month: YearMonth, product: usize) -> Option<Option<f64>> {
        let row = self.row_index(location, month)?;
        self.rows[row].values.get(product).copied()
    }

    pub fn cell(&self, row: usize, product: usize) -> Option<f64> {
        self.rows[row].values[product]
    }

    /// Fill a gap in place; see [`fill_gap`].
    pub fn fill_cell(&mut self, row: usize, product: usize, value: f64) -> bool {
        fill_gap(&mut self.rows[row].values[product], value)
    }

    /// Overwrite a cell unconditionally.
    pub fn set_cell(&mut self, row: usize, product: usize, value: Option<f64>) {
        self.rows[row].values[product] = value;
    }

    /// Distinct locations in order of first appearance.
    pub fn locations(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.iter().any(|l: &String| l == &row.location) {
                seen.push(row.location.clone());
            }
        }
        seen
    }

    /// Row indices of one location, ordered by month.
    pub fn series_rows(&self, location: &str) -> Vec<usize> {
        let mut rows: Vec<(YearMonth, usize)> = self
            .index
            .get(location)
            .map(|m| m.iter().map(|(month, &row)| (*month, row)).collect())
            .unwrap_or_default();
        rows.sort_unstable();
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Values of one product over the given rows.
    pub fn column(&self, rows: &[usize], product: usize) -> Vec<Option<f64>> {
        rows.iter().map(|&r| self.rows[r].values[product]).collect()
    }

    /// Write a column slice back over the given rows.
    pub fn write_column(&mut self, rows: &[usize], product: usize, values: &[Option<f64>]) -> Result<()> {
        if rows.len() != values.len() {
            return Err(ImputeError::DimensionMismatch {
                expected: rows.len(),
                got: values.len(),
            });
        }
        for (&row, &value) in rows.iter().zip(values) {
            self.rows[row].values[product] = value;
        }
        Ok(())
    }

    /// Total number of gaps over all cells.
    pub fn missing_count(&self) -> usize {
        self.rows.iter().map(|r| missing_count(&r.values)).sum()
    }

    /// Check that each location covers one unbroken run of months.
    pub fn validate_contiguous(&self) -> Result<()> {
        for location in self.locations() {
            let rows = self.series_rows(&location);
            for pair in rows.windows(2) {
                let (prev, next) = (self.rows[pair[0]].month, self.rows[pair[1]].month);
                if prev.months_until(next) != 1 {
                    return Err(ImputeError::NonContiguousMonths {
                        location,
                        after: prev,
                    });
                }
            }
        }
        Ok(())
    }

    /// Rebuild the table over the full `[start, end]` month range for the
    /// given locations, month-major. Missing (location, month) pairs become
    /// all-gap rows; rows outside the range or for other locations are cut.
    pub fn complete_months<S: AsRef<str>>(
        &self,
        start: YearMonth,
        end: YearMonth,
        locations: &[S],
    ) -> Result<PriceTable> {
        let mut completed = PriceTable::new(self.level, self.products.clone())?;
        for month in YearMonth::range_inclusive(start, end) {
            for location in locations {
                let location = location.as_ref();
                let values = match self.row_index(location, month) {
                    Some(row) => self.rows[row].values.clone(),
                    None => vec![None; self.products.len()],
                };
                completed.push_row(location, month, values)?;
            }
        }
        Ok(completed)
    }

    /// Remove rows whose location name is blank. Returns how many were removed.
    pub fn drop_blank_locations(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r.location.trim().is_empty());
        let removed = before - self.rows.len();
        if removed > 0 {
            self.rebuild_index();
        }
        removed
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, row) in self.rows.iter().enumerate() {
            self.index
                .entry(row.location.clone())
                .or_default()
                .insert(row.month, i);
        }
    }
}
