//! FILENAME: query-engine/src/lib.rs
//! Query subsystem for the crop statistics dashboard.
//!
//! This crate provides the aggregation queries behind every dashboard chart.
//! It depends on `engine` only for the record model and the filter engine
//! (CropRecord, CropTable, FilterSelection).
//!
//! Layers:
//! - `definition`: Serializable configuration (how queries order and limit)
//! - `grouping`: Accumulators and group-by tables (HOW we aggregate)
//! - `view`: Chart-ready result shapes (WHAT we display)
//! - `engine`: The queries themselves
//! - `dashboard`: All dashboard charts for one selection, computed in parallel

pub mod dashboard;
pub mod definition;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod view;

pub use dashboard::{compute_dashboard, DashboardView};
pub use definition::*;
pub use error::QueryError;
pub use grouping::{AggregateAccumulator, CoMomentAccumulator, GroupRow, GroupedMeasures};
pub use view::*;
pub use crate::engine::{
    correlation, crop_vs_state_trend, crop_wise_production, seasonal_trends,
    states_with_decline, time_series, top_districts, yield_by_district, yield_vs_area,
    QueryEngine,
};
