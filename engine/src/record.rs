//! FILENAME: engine/src/record.rs
//! PURPOSE: Defines a single row of the crop statistics dataset.
//! CONTEXT: This file contains the `CropRecord` struct plus the `Dimension`
//! and `Measure` enums that name its categorical and numeric columns.
//! Queries address columns through these enums instead of string headers.

use serde::{Deserialize, Serialize};

// ============================================================================
// COLUMNS
// ============================================================================

/// Categorical (string) columns of the dataset. Every filter and grouping
/// key is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    State,
    District,
    Crop,
    Season,
    Year,
}

impl Dimension {
    /// All dimensions in source column order.
    pub const ALL: [Dimension; 5] = [
        Dimension::State,
        Dimension::District,
        Dimension::Crop,
        Dimension::Season,
        Dimension::Year,
    ];

    /// Column header as it appears in the source dataset.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::State => "State",
            Dimension::District => "District",
            Dimension::Crop => "Crop",
            Dimension::Season => "Season",
            Dimension::Year => "Year",
        }
    }
}

/// Numeric columns of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measure {
    Area,
    Production,
    Yield,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Area, Measure::Production, Measure::Yield];

    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Area => "Area",
            Measure::Production => "Production",
            Measure::Yield => "Yield",
        }
    }

    /// Position of this measure inside `Measure::ALL`.
    pub fn index(self) -> usize {
        match self {
            Measure::Area => 0,
            Measure::Production => 1,
            Measure::Yield => 2,
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One observation: a crop grown in a district during one season of one
/// fiscal year.
///
/// `year` is a fiscal-year label such as "2001-02" and is kept as text.
/// Numeric columns may hold NaN when the source left the cell blank; every
/// aggregation skips NaN values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CropRecord {
    pub state: String,
    pub district: String,
    pub crop: String,
    pub season: String,
    pub year: String,
    pub area: f64,
    pub production: f64,
    /// Measured yield. Not derived from production / area.
    #[serde(rename = "Yield")]
    pub crop_yield: f64,
}

impl CropRecord {
    /// Creates a record with all measures set to zero.
    pub fn new(
        state: impl Into<String>,
        district: impl Into<String>,
        crop: impl Into<String>,
        season: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        CropRecord {
            state: state.into(),
            district: district.into(),
            crop: crop.into(),
            season: season.into(),
            year: year.into(),
            area: 0.0,
            production: 0.0,
            crop_yield: 0.0,
        }
    }

    /// Sets the three numeric columns.
    pub fn with_measures(mut self, area: f64, production: f64, crop_yield: f64) -> Self {
        self.area = area;
        self.production = production;
        self.crop_yield = crop_yield;
        self
    }

    /// Returns the value of a categorical column.
    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::State => &self.state,
            Dimension::District => &self.district,
            Dimension::Crop => &self.crop,
            Dimension::Season => &self.season,
            Dimension::Year => &self.year,
        }
    }

    /// Returns the value of a numeric column.
    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Area => self.area,
            Measure::Production => self.production,
            Measure::Yield => self.crop_yield,
        }
    }
}
