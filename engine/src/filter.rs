//! FILENAME: engine/src/filter.rs
//! PURPOSE: The filter engine: multi-value selections over categorical columns.
//! CONTEXT: A `FilterSelection` holds one `ValueSet` per dimension. Sets are
//! combined with AND across dimensions and OR within a dimension. An empty
//! set never restricts anything. Cascading defaults (picking a first value
//! downstream when an upstream field changes) belong to the UI, not here.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::record::{CropRecord, Dimension};
use crate::table::CropTable;

// ============================================================================
// VALUE SET
// ============================================================================

/// The allowed values for one column. Empty means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueSet(FxHashSet<String>);

impl ValueSet {
    pub fn new() -> Self {
        ValueSet(FxHashSet::default())
    }

    /// True when this set imposes no restriction.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Membership test, where an empty set admits everything.
    pub fn allows(&self, value: &str) -> bool {
        self.0.is_empty() || self.0.contains(value)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ValueSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ValueSet(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// FILTER SELECTION
// ============================================================================

/// The user's current filter choices for the five categorical columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub states: ValueSet,
    #[serde(default)]
    pub districts: ValueSet,
    #[serde(default)]
    pub crops: ValueSet,
    #[serde(default)]
    pub seasons: ValueSet,
    #[serde(default)]
    pub years: ValueSet,
}

impl FilterSelection {
    /// A selection with no constraints (matches every row).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the allowed values for `dimension`.
    pub fn with<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.values_mut(dimension) = values.into_iter().collect();
        self
    }

    pub fn with_states<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::State, values)
    }

    pub fn with_districts<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::District, values)
    }

    pub fn with_crops<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::Crop, values)
    }

    pub fn with_seasons<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::Season, values)
    }

    pub fn with_years<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::Year, values)
    }

    pub fn values(&self, dimension: Dimension) -> &ValueSet {
        match dimension {
            Dimension::State => &self.states,
            Dimension::District => &self.districts,
            Dimension::Crop => &self.crops,
            Dimension::Season => &self.seasons,
            Dimension::Year => &self.years,
        }
    }

    pub fn values_mut(&mut self, dimension: Dimension) -> &mut ValueSet {
        match dimension {
            Dimension::State => &mut self.states,
            Dimension::District => &mut self.districts,
            Dimension::Crop => &mut self.crops,
            Dimension::Season => &mut self.seasons,
            Dimension::Year => &mut self.years,
        }
    }

    /// True when no dimension is constrained.
    pub fn is_unrestricted(&self) -> bool {
        Dimension::ALL
            .iter()
            .all(|&d| self.values(d).is_unrestricted())
    }

    /// Returns a copy with the given dimensions unconstrained.
    pub fn without(&self, dimensions: &[Dimension]) -> FilterSelection {
        let mut relaxed = self.clone();
        for &dimension in dimensions {
            relaxed.values_mut(dimension).clear();
        }
        relaxed
    }

    /// A record passes when every constrained dimension admits its value.
    pub fn matches(&self, record: &CropRecord) -> bool {
        Dimension::ALL
            .iter()
            .all(|&d| self.values(d).allows(record.dimension(d)))
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Returns a new table with exactly the rows of `table` that satisfy
/// `selection`, in their original order. `table` is left untouched.
pub fn apply_filters(table: &CropTable, selection: &FilterSelection) -> CropTable {
    if selection.is_unrestricted() {
        return table.clone();
    }

    let filtered: CropTable = table
        .iter()
        .filter(|record| selection.matches(record))
        .cloned()
        .collect();

    log::debug!(
        "[FILTER] kept {} of {} rows",
        filtered.len(),
        table.len()
    );

    filtered
}
