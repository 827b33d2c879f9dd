//! FILENAME: engine/src/table.rs
//! PURPOSE: The in-memory crop dataset (base table and filtered views).
//! CONTEXT: A `CropTable` is an ordered list of records. The base dataset is
//! built once by the caller's loading step; every filter produces a new
//! table and never touches its input.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::filter::{apply_filters, FilterSelection};
use crate::record::{CropRecord, Dimension, Measure};

/// Ordered collection of crop records. Row order is significant: filters
/// and projections keep it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropTable {
    records: Vec<CropRecord>,
}

impl CropTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        CropTable { records: Vec::new() }
    }

    /// Reserves capacity for `record_count` more rows. The XLSX loader
    /// calls this with the sheet height.
    pub fn reserve(&mut self, record_count: usize) {
        self.records.reserve(record_count);
    }

    /// Appends a record. Only the loading step builds tables this way.
    pub fn push(&mut self, record: CropRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CropRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CropRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new table holding the rows that pass `selection`.
    pub fn filter(&self, selection: &FilterSelection) -> CropTable {
        apply_filters(self, selection)
    }

    /// Sorted distinct values of a categorical column.
    /// Used to populate selection widgets; imposes no default choice.
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<String> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut values: Vec<String> = Vec::new();

        for record in &self.records {
            let value = record.dimension(dimension);
            if seen.insert(value) {
                values.push(value.to_string());
            }
        }

        values.sort();
        values
    }

    /// Sum of a numeric column, skipping NaN.
    pub fn measure_total(&self, measure: Measure) -> f64 {
        self.records
            .iter()
            .map(|r| r.measure(measure))
            .filter(|v| !v.is_nan())
            .sum()
    }
}

impl FromIterator<CropRecord> for CropTable {
    fn from_iter<I: IntoIterator<Item = CropRecord>>(iter: I) -> Self {
        CropTable {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CropTable {
    type Item = &'a CropRecord;
    type IntoIter = std::slice::Iter<'a, CropRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
