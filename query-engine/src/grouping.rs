//! FILENAME: query-engine/src/grouping.rs
//! Grouping - Accumulators and group-by tables used by every query.
//!
//! The grouping layer is designed for:
//! - A single O(n) pass over the filtered view
//! - No re-scan when a query reads several measures of the same group
//! - NaN-skipping aggregation (a blank measure never poisons a group)
//!
//! Architecture:
//! - `AggregateAccumulator` holds the running state of one measure
//! - `CoMomentAccumulator` holds the running state of a measure pair
//! - `GroupedMeasures` maps a group key to one accumulator per measure

use std::cmp::Ordering;
use std::hash::Hash;

use engine::{CropRecord, Measure};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::AggregationType;

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Accumulator for computing aggregates incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateAccumulator {
    pub sum: f64,
    /// Number of non-NaN values seen.
    pub count: u64,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator { sum: 0.0, count: 0 }
    }

    /// Adds a value. NaN is treated as missing and skipped.
    pub fn add_number(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.sum += value;
        self.count += 1;
    }

    /// Computes the final aggregate value.
    /// The average of zero values is NaN; the sum of zero values is 0.
    pub fn compute(&self, aggregation: AggregationType) -> f64 {
        match aggregation {
            AggregationType::Sum => self.sum,
            AggregationType::Average => {
                if self.count > 0 {
                    self.sum / (self.count as f64)
                } else {
                    f64::NAN
                }
            }
        }
    }
}

// ============================================================================
// CO-MOMENT ACCUMULATOR
// ============================================================================

/// Running means and (co)moments for a pair of columns.
/// Uses Welford's algorithm for numerical stability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoMomentAccumulator {
    pub count: u64,
    pub mean_x: f64,
    pub mean_y: f64,
    /// Sum of squared differences from the mean of x.
    pub m2_x: f64,
    /// Sum of squared differences from the mean of y.
    pub m2_y: f64,
    /// Sum of co-deviations.
    pub c_xy: f64,
}

impl CoMomentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observation pair. Pairs with a NaN on either side are skipped
    /// (pairwise-complete statistics).
    pub fn add_pair(&mut self, x: f64, y: f64) {
        if x.is_nan() || y.is_nan() {
            return;
        }

        self.count += 1;
        let n = self.count as f64;

        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        let dy = y - self.mean_y;
        self.mean_y += dy / n;

        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    /// Pearson correlation coefficient, or NaN when it is undefined
    /// (fewer than two pairs or a constant column).
    /// Rounding in the running moments can overshoot by a few ulps, so the
    /// result is clamped to [-1, 1].
    pub fn pearson(&self) -> f64 {
        if self.count < 2 || self.m2_x <= 0.0 || self.m2_y <= 0.0 {
            return f64::NAN;
        }
        (self.c_xy / (self.m2_x * self.m2_y).sqrt()).clamp(-1.0, 1.0)
    }

    /// Whether the x column has non-zero variance over at least two values.
    pub fn x_varies(&self) -> bool {
        self.count >= 2 && self.m2_x > 0.0
    }
}

// ============================================================================
// GROUPED MEASURES
// ============================================================================

/// Accumulators for the measures tracked by one group.
pub type MeasureAccumulators = SmallVec<[AggregateAccumulator; 3]>;

/// Group-by table: one set of measure accumulators per distinct key.
#[derive(Debug, Clone)]
pub struct GroupedMeasures<K> {
    measures: SmallVec<[Measure; 3]>,
    groups: FxHashMap<K, MeasureAccumulators>,
}

impl<K: Eq + Hash> GroupedMeasures<K> {
    /// Creates an empty table tracking `measures`.
    pub fn new(measures: &[Measure]) -> Self {
        GroupedMeasures {
            measures: measures.iter().copied().collect(),
            groups: FxHashMap::default(),
        }
    }

    /// Groups `records` by `key_fn` in one pass.
    pub fn build<'a, I, F>(records: I, measures: &[Measure], mut key_fn: F) -> Self
    where
        I: IntoIterator<Item = &'a CropRecord>,
        F: FnMut(&'a CropRecord) -> K,
    {
        let mut grouped = Self::new(measures);
        for record in records {
            grouped.add_record(key_fn(record), record);
        }
        grouped
    }

    /// Adds one record's measures to the group `key`.
    pub fn add_record(&mut self, key: K, record: &CropRecord) {
        let measure_count = self.measures.len();
        let accumulators = self
            .groups
            .entry(key)
            .or_insert_with(|| SmallVec::from_elem(AggregateAccumulator::new(), measure_count));

        for (acc, &measure) in accumulators.iter_mut().zip(self.measures.iter()) {
            acc.add_number(record.measure(measure));
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Computes `aggregation` of `measure` for the group `key`.
    /// Returns `None` for an unknown key or an untracked measure.
    pub fn value(&self, key: &K, measure: Measure, aggregation: AggregationType) -> Option<f64> {
        let slot = self.measures.iter().position(|&m| m == measure)?;
        self.groups
            .get(key)
            .and_then(|accs| accs.get(slot))
            .map(|acc| acc.compute(aggregation))
    }

    /// Consumes the table, returning groups ordered by `compare` on keys.
    pub fn into_sorted_by<C>(self, mut compare: C) -> Vec<GroupRow<K>>
    where
        C: FnMut(&K, &K) -> Ordering,
    {
        let measures = self.measures;
        let mut rows: Vec<GroupRow<K>> = self
            .groups
            .into_iter()
            .map(|(key, accumulators)| GroupRow {
                key,
                measures: measures.clone(),
                accumulators,
            })
            .collect();
        // Keys are unique, so an unstable sort yields a deterministic order
        rows.sort_unstable_by(|a, b| compare(&a.key, &b.key));
        rows
    }
}

/// One group of a sorted group-by result.
#[derive(Debug, Clone)]
pub struct GroupRow<K> {
    pub key: K,
    measures: SmallVec<[Measure; 3]>,
    accumulators: MeasureAccumulators,
}

impl<K> GroupRow<K> {
    /// Computes `aggregation` of `measure`. Untracked measures yield NaN.
    pub fn value(&self, measure: Measure, aggregation: AggregationType) -> f64 {
        self.measures
            .iter()
            .position(|&m| m == measure)
            .and_then(|slot| self.accumulators.get(slot))
            .map(|acc| acc.compute(aggregation))
            .unwrap_or(f64::NAN)
    }
}
