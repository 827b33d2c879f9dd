//! FILENAME: query-engine/src/dashboard.rs
//! Dashboard - Evaluates the dashboard charts for one filter selection.
//!
//! The base table is filtered once and the six chart queries then run in
//! parallel over the shared, read-only view.

use engine::{apply_filters, CropTable, FilterSelection};
use serde::{Deserialize, Serialize};

use crate::definition::QueryConfig;
use crate::engine::QueryEngine;
use crate::view::{
    CorrelationMatrix, CrossTab, DistrictProduction, IntoResultTable, ResultTable,
    YearlySummary, YieldAreaPoint,
};

/// Every chart of the dashboard page for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    /// Number of rows that passed the selection.
    pub row_count: usize,
    pub correlation: CorrelationMatrix,
    pub time_series: Vec<YearlySummary>,
    pub top_districts: Vec<DistrictProduction>,
    pub yield_by_district: CrossTab,
    pub yield_vs_area: Vec<YieldAreaPoint>,
    pub crop_wise_production: CrossTab,
}

impl DashboardView {
    /// Flattens every chart into a named `ResultTable`, in page order.
    pub fn result_tables(&self) -> Vec<ResultTable> {
        vec![
            self.correlation.to_result_table("Correlation Matrix"),
            self.time_series.to_result_table("Time Series"),
            self.top_districts.to_result_table("Top Producing Districts"),
            self.yield_by_district.to_result_table("Yield by District"),
            self.yield_vs_area.to_result_table("Yield vs Area"),
            self.crop_wise_production.to_result_table("Crop Wise Production"),
        ]
    }
}

impl QueryEngine {
    /// Filters `base` with `selection` and computes every dashboard chart.
    pub fn dashboard(&self, base: &CropTable, selection: &FilterSelection) -> DashboardView {
        let view = apply_filters(base, selection);

        let (
            (correlation, time_series),
            ((top_districts, yield_by_district), (yield_vs_area, crop_wise_production)),
        ) = rayon::join(
            || rayon::join(|| self.correlation(&view), || self.time_series(&view)),
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || self.limited_top_districts(&view),
                            || self.yield_by_district(&view),
                        )
                    },
                    || {
                        rayon::join(
                            || self.yield_vs_area(&view),
                            || self.crop_wise_production(&view),
                        )
                    },
                )
            },
        );

        log::debug!(
            "[QUERY] dashboard rows={} districts={} years={}",
            view.len(),
            top_districts.len(),
            time_series.len()
        );

        DashboardView {
            selection: selection.clone(),
            row_count: view.len(),
            correlation,
            time_series,
            top_districts,
            yield_by_district,
            yield_vs_area,
            crop_wise_production,
        }
    }

    /// Leaderboard truncated to `top_districts_limit`, when one is set.
    fn limited_top_districts(&self, view: &CropTable) -> Vec<DistrictProduction> {
        let mut rows = self.top_districts(view);
        if let Some(limit) = self.config().top_districts_limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Computes the dashboard with an explicit configuration.
pub fn compute_dashboard(
    base: &CropTable,
    selection: &FilterSelection,
    config: &QueryConfig,
) -> DashboardView {
    QueryEngine::new(config.clone()).dashboard(base, selection)
}
