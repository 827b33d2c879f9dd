//! FILENAME: query-engine/src/definition.rs
//! Query Definition - The serializable configuration.
//!
//! This module contains the types that DESCRIBE how queries are evaluated.
//! These structures are designed to be:
//! - Serializable (loaded from JSON by the embedding application)
//! - Sent over a presentation bridge unchanged
//! - Immutable snapshots of caller intent

use std::cmp::Ordering;

use engine::Dimension;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Default threshold (percent) for yield decline detection.
pub const DEFAULT_DECLINE_PCT: f64 = 10.0;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for measure columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AggregationType {
    #[default]
    Sum,
    /// Unweighted arithmetic mean.
    Average,
}

// ============================================================================
// YEAR ORDERING
// ============================================================================

/// How fiscal-year labels ("2001-02") are ordered wherever a query sorts
/// years or picks the first/last year.
///
/// `Lexicographic` compares the raw label text. It matches calendar order
/// only when all labels share a digit width, so "10-11" sorts before "9-10".
/// `Chronological` compares the leading integer of each label instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearOrder {
    #[default]
    Lexicographic,
    Chronological,
}

impl YearOrder {
    /// Compares two year labels.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            YearOrder::Lexicographic => a.cmp(b),
            YearOrder::Chronological => match (leading_year(a), leading_year(b)) {
                (Some(ya), Some(yb)) => ya.cmp(&yb).then_with(|| a.cmp(b)),
                // Labels without a leading number go last
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.cmp(b),
            },
        }
    }

    /// Compares two values of `dimension`. Only `Year` is affected by the
    /// ordering policy; every other dimension sorts as plain text.
    pub fn compare_dimension(self, dimension: Dimension, a: &str, b: &str) -> Ordering {
        match dimension {
            Dimension::Year => self.compare(a, b),
            _ => a.cmp(b),
        }
    }
}

/// Parses the leading run of ASCII digits ("2001" in "2001-02").
fn leading_year(label: &str) -> Option<u64> {
    let trimmed = label.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

// ============================================================================
// QUERY CONFIG
// ============================================================================

/// Evaluation settings shared by every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Threshold used by the config-driven decline query.
    pub decline_threshold_pct: f64,

    /// Ordering policy for year labels.
    pub year_order: YearOrder,

    /// Truncates the top-districts leaderboard in the dashboard bundle.
    /// `None` keeps every district.
    pub top_districts_limit: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            decline_threshold_pct: DEFAULT_DECLINE_PCT,
            year_order: YearOrder::Lexicographic,
            top_districts_limit: None,
        }
    }
}

impl QueryConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let config: QueryConfig = serde_json::from_str(json)?;
        if config.decline_threshold_pct.is_nan() {
            return Err(QueryError::InvalidThreshold(config.decline_threshold_pct));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_year_order(mut self, year_order: YearOrder) -> Self {
        self.year_order = year_order;
        self
    }

    pub fn with_decline_threshold(mut self, pct: f64) -> Self {
        self.decline_threshold_pct = pct;
        self
    }

    pub fn with_top_districts_limit(mut self, limit: usize) -> Self {
        self.top_districts_limit = Some(limit);
        self
    }
}
