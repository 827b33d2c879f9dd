//! FILENAME: query-engine/src/engine.rs
//! Query Engine - Transforms a filtered crop view into derived tables.
//!
//! Every query is a pure function of its borrowed input: nothing is cached
//! and the input table is never modified. Seven queries read an already
//! filtered view; the trend comparison and the decline detector take the
//! base table and apply their own (partial) filtering.
//!
//! Ordering rules:
//! - Group keys come out in ascending key order
//! - Years follow the configured `YearOrder` (text order by default)
//! - The leaderboard sorts by value with a stable sort, so equal totals keep
//!   their key order

use std::cmp::Ordering;

use engine::{apply_filters, CropTable, Dimension, FilterSelection, Measure};
use rustc_hash::FxHashMap;

use crate::definition::{AggregationType, QueryConfig, YearOrder};
use crate::error::QueryError;
use crate::grouping::{CoMomentAccumulator, GroupedMeasures};
use crate::view::{
    CorrelationMatrix, CrossTab, CrossTabRow, DistrictProduction, SeasonalTrend, TrendPoint,
    YearlySummary, YieldAreaPoint, YieldDecline,
};

// ============================================================================
// QUERY ENGINE
// ============================================================================

/// Evaluates queries under one `QueryConfig`.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    config: QueryConfig,
}

impl QueryEngine {
    pub fn new(config: QueryConfig) -> Self {
        QueryEngine { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn year_order(&self) -> YearOrder {
        self.config.year_order
    }

    // ========================================================================
    // CORRELATION
    // ========================================================================

    /// Pearson correlation matrix over Area, Production and Yield.
    ///
    /// Off-diagonal entries are NaN when either column is constant or fewer
    /// than two complete pairs exist. The diagonal is exactly 1.0 for a
    /// column with non-zero variance and NaN otherwise.
    pub fn correlation(&self, view: &CropTable) -> CorrelationMatrix {
        let measures = Measure::ALL;
        let mut pairs = [[CoMomentAccumulator::new(); 3]; 3];

        for record in view {
            for (i, &mi) in measures.iter().enumerate() {
                for (j, &mj) in measures.iter().enumerate().skip(i) {
                    pairs[i][j].add_pair(record.measure(mi), record.measure(mj));
                }
            }
        }

        let mut values = [[f64::NAN; 3]; 3];
        for i in 0..3 {
            values[i][i] = if pairs[i][i].x_varies() { 1.0 } else { f64::NAN };
            for j in (i + 1)..3 {
                let r = pairs[i][j].pearson();
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        log::debug!("[QUERY] correlation over {} rows", view.len());

        CorrelationMatrix { measures, values }
    }

    // ========================================================================
    // LEADERBOARD & PROJECTION
    // ========================================================================

    /// Total production per district, largest first.
    pub fn top_districts(&self, view: &CropTable) -> Vec<DistrictProduction> {
        let mut rows: Vec<DistrictProduction> =
            GroupedMeasures::build(view, &[Measure::Production], |r| r.district.as_str())
                .into_sorted_by(|a, b| a.cmp(b))
                .into_iter()
                .map(|group| DistrictProduction {
                    district: group.key.to_string(),
                    production: group.value(Measure::Production, AggregationType::Sum),
                })
                .collect();

        // Stable: ties keep ascending district order
        rows.sort_by(|a, b| {
            b.production
                .partial_cmp(&a.production)
                .unwrap_or(Ordering::Equal)
        });

        rows
    }

    /// Area/yield scatter points, one per input row in input order.
    pub fn yield_vs_area(&self, view: &CropTable) -> Vec<YieldAreaPoint> {
        view.iter()
            .map(|r| YieldAreaPoint {
                area: r.area,
                crop_yield: r.crop_yield,
                crop: r.crop.clone(),
                district: r.district.clone(),
                year: r.year.clone(),
            })
            .collect()
    }

    // ========================================================================
    // TIME SERIES
    // ========================================================================

    /// Per-year summed area and production with mean yield.
    pub fn time_series(&self, view: &CropTable) -> Vec<YearlySummary> {
        let order = self.year_order();

        GroupedMeasures::build(view, &Measure::ALL, |r| r.year.as_str())
            .into_sorted_by(|a, b| order.compare(a, b))
            .into_iter()
            .map(|group| YearlySummary {
                year: group.key.to_string(),
                area: group.value(Measure::Area, AggregationType::Sum),
                production: group.value(Measure::Production, AggregationType::Sum),
                mean_yield: group.value(Measure::Yield, AggregationType::Average),
            })
            .collect()
    }

    // ========================================================================
    // CROSS-TABULATIONS
    // ========================================================================

    /// Year × Crop table of summed production.
    pub fn crop_wise_production(&self, view: &CropTable) -> CrossTab {
        self.cross_tabulate(
            view,
            Dimension::Year,
            Dimension::Crop,
            Measure::Production,
            AggregationType::Sum,
        )
    }

    /// District × Year table of mean yield.
    pub fn yield_by_district(&self, view: &CropTable) -> CrossTab {
        self.cross_tabulate(
            view,
            Dimension::District,
            Dimension::Year,
            Measure::Yield,
            AggregationType::Average,
        )
    }

    /// Builds a dense cross-tab of `measure` aggregated over every
    /// (row value, column value) pair present in `view`.
    ///
    /// Rows and columns are the distinct values found in the view, sorted.
    /// A cell with no records, or whose aggregate is NaN, holds 0.
    pub fn cross_tabulate(
        &self,
        view: &CropTable,
        row_dimension: Dimension,
        column_dimension: Dimension,
        measure: Measure,
        aggregation: AggregationType,
    ) -> CrossTab {
        let order = self.year_order();

        let grouped = GroupedMeasures::build(view, &[measure], |r| {
            (r.dimension(row_dimension), r.dimension(column_dimension))
        });

        if grouped.is_empty() {
            return CrossTab::empty(row_dimension, column_dimension, measure, aggregation);
        }

        let mut row_labels = view.distinct_values(row_dimension);
        row_labels.sort_by(|a, b| order.compare_dimension(row_dimension, a, b));
        let mut columns = view.distinct_values(column_dimension);
        columns.sort_by(|a, b| order.compare_dimension(column_dimension, a, b));

        let rows = row_labels
            .into_iter()
            .map(|label| {
                let values = columns
                    .iter()
                    .map(|col| {
                        grouped
                            .value(&(label.as_str(), col.as_str()), measure, aggregation)
                            .filter(|v| !v.is_nan())
                            .unwrap_or(0.0)
                    })
                    .collect();
                CrossTabRow { label, values }
            })
            .collect();

        CrossTab {
            row_dimension,
            column_dimension,
            measure,
            aggregation,
            columns,
            rows,
        }
    }

    // ========================================================================
    // TREND COMPARISON
    // ========================================================================

    /// Compares the yearly mean yield under the full selection with the
    /// yearly mean yield of the surrounding state population.
    ///
    /// The state series applies only the state, crop and season constraints;
    /// district and year constraints are deliberately not applied. The join
    /// keeps the district series' years: years only present at state level
    /// are dropped, and a district year without a state counterpart gets
    /// `state_yield: None`.
    pub fn crop_vs_state_trend(
        &self,
        base: &CropTable,
        selection: &FilterSelection,
    ) -> Vec<TrendPoint> {
        let order = self.year_order();

        let local_view = apply_filters(base, selection);
        let state_view =
            apply_filters(base, &selection.without(&[Dimension::District, Dimension::Year]));

        let state_series: FxHashMap<String, f64> =
            yearly_mean_yield(&state_view, order).into_iter().collect();

        yearly_mean_yield(&local_view, order)
            .into_iter()
            .map(|(year, district_yield)| {
                let state_yield = state_series.get(&year).copied();
                TrendPoint {
                    year,
                    district_yield,
                    state_yield,
                }
            })
            .collect()
    }

    // ========================================================================
    // DECLINE DETECTION
    // ========================================================================

    /// States whose mean yield of `crop` fell by at least `decline_pct`
    /// percent between their first and last year.
    ///
    /// Years are ordered per state with the configured `YearOrder`; "first"
    /// and "last" are positions in that ordering. A zero start yield gives an
    /// infinite or NaN percentage, which is kept as-is (NaN never passes the
    /// threshold, so a NaN `decline_pct` matches no state). Fails only when
    /// `crop` is blank.
    pub fn states_with_decline(
        &self,
        base: &CropTable,
        crop: &str,
        decline_pct: f64,
    ) -> Result<Vec<YieldDecline>, QueryError> {
        if crop.trim().is_empty() {
            return Err(QueryError::MissingCrop);
        }

        let order = self.year_order();

        let state_years = GroupedMeasures::build(
            base.iter().filter(|r| r.crop == crop),
            &[Measure::Yield],
            |r| (r.state.as_str(), r.year.as_str()),
        )
        .into_sorted_by(|a, b| a.0.cmp(b.0).then_with(|| order.compare(a.1, b.1)));

        // Rows are grouped by state and sorted by year within each state
        let mut declines = Vec::new();
        let mut start = 0;
        while start < state_years.len() {
            let state = state_years[start].key.0;
            let end = state_years[start..]
                .iter()
                .position(|g| g.key.0 != state)
                .map_or(state_years.len(), |offset| start + offset);

            let yields: Vec<f64> = state_years[start..end]
                .iter()
                .map(|g| g.value(Measure::Yield, AggregationType::Average))
                .filter(|v| !v.is_nan())
                .collect();

            let start_yield = yields.first().copied().unwrap_or(f64::NAN);
            let end_yield = yields.last().copied().unwrap_or(f64::NAN);
            let pct = (start_yield - end_yield) / start_yield * 100.0;

            if pct >= decline_pct {
                declines.push(YieldDecline {
                    state: state.to_string(),
                    start_yield,
                    end_yield,
                    decline_pct: pct,
                });
            }

            start = end;
        }

        log::debug!(
            "[QUERY] decline crop={} threshold={} matched={}",
            crop,
            decline_pct,
            declines.len()
        );

        Ok(declines)
    }

    /// `states_with_decline` using the configured threshold.
    pub fn states_with_configured_decline(
        &self,
        base: &CropTable,
        crop: &str,
    ) -> Result<Vec<YieldDecline>, QueryError> {
        self.states_with_decline(base, crop, self.config.decline_threshold_pct)
    }

    // ========================================================================
    // SEASONAL TRENDS
    // ========================================================================

    /// Totals per (State, District, Season, Year), sorted by that tuple.
    pub fn seasonal_trends(&self, view: &CropTable) -> Vec<SeasonalTrend> {
        let order = self.year_order();

        GroupedMeasures::build(view, &Measure::ALL, |r| {
            (
                r.state.as_str(),
                r.district.as_str(),
                r.season.as_str(),
                r.year.as_str(),
            )
        })
        .into_sorted_by(|a, b| {
            a.0.cmp(b.0)
                .then_with(|| a.1.cmp(b.1))
                .then_with(|| a.2.cmp(b.2))
                .then_with(|| order.compare(a.3, b.3))
        })
        .into_iter()
        .map(|group| {
            let (state, district, season, year) = group.key;
            SeasonalTrend {
                state: state.to_string(),
                district: district.to_string(),
                season: season.to_string(),
                year: year.to_string(),
                area: group.value(Measure::Area, AggregationType::Sum),
                production: group.value(Measure::Production, AggregationType::Sum),
                mean_yield: group.value(Measure::Yield, AggregationType::Average),
            }
        })
        .collect()
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Mean yield per year, in year order.
fn yearly_mean_yield(view: &CropTable, order: YearOrder) -> Vec<(String, f64)> {
    GroupedMeasures::build(view, &[Measure::Yield], |r| r.year.as_str())
        .into_sorted_by(|a, b| order.compare(a, b))
        .into_iter()
        .map(|group| {
            (
                group.key.to_string(),
                group.value(Measure::Yield, AggregationType::Average),
            )
        })
        .collect()
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Correlation matrix with the default configuration.
pub fn correlation(view: &CropTable) -> CorrelationMatrix {
    QueryEngine::default().correlation(view)
}

/// District production leaderboard with the default configuration.
pub fn top_districts(view: &CropTable) -> Vec<DistrictProduction> {
    QueryEngine::default().top_districts(view)
}

pub fn yield_vs_area(view: &CropTable) -> Vec<YieldAreaPoint> {
    QueryEngine::default().yield_vs_area(view)
}

pub fn time_series(view: &CropTable) -> Vec<YearlySummary> {
    QueryEngine::default().time_series(view)
}

pub fn crop_wise_production(view: &CropTable) -> CrossTab {
    QueryEngine::default().crop_wise_production(view)
}

pub fn yield_by_district(view: &CropTable) -> CrossTab {
    QueryEngine::default().yield_by_district(view)
}

pub fn crop_vs_state_trend(base: &CropTable, selection: &FilterSelection) -> Vec<TrendPoint> {
    QueryEngine::default().crop_vs_state_trend(base, selection)
}

pub fn states_with_decline(
    base: &CropTable,
    crop: &str,
    decline_pct: f64,
) -> Result<Vec<YieldDecline>, QueryError> {
    QueryEngine::default().states_with_decline(base, crop, decline_pct)
}

pub fn seasonal_trends(view: &CropTable) -> Vec<SeasonalTrend> {
    QueryEngine::default().seasonal_trends(view)
}
