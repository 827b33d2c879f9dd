//! FILENAME: query-engine/src/view.rs
//! Query View - Result tables handed to the presentation layer.
//!
//! Each query returns a typed result (rows of a struct, a matrix, or a
//! cross-tab with a query-time column set). Every typed result can also be
//! flattened into a generic `ResultTable` for export or uniform rendering.

use engine::{Dimension, Measure};
use serde::{Deserialize, Serialize};

use crate::definition::AggregationType;

// ============================================================================
// TYPED RESULTS
// ============================================================================

/// Pairwise Pearson coefficients over Area, Production and Yield.
/// Undefined coefficients are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub measures: [Measure; 3],
    /// `values[i][j]` correlates `measures[i]` with `measures[j]`.
    pub values: [[f64; 3]; 3],
}

impl CorrelationMatrix {
    pub fn get(&self, a: Measure, b: Measure) -> f64 {
        self.values[a.index()][b.index()]
    }
}

/// Leaderboard row: total production of one district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistrictProduction {
    pub district: String,
    pub production: f64,
}

/// Scatter point for yield against cultivated area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YieldAreaPoint {
    pub area: f64,
    #[serde(rename = "Yield")]
    pub crop_yield: f64,
    pub crop: String,
    pub district: String,
    pub year: String,
}

/// Per-year totals: summed area and production, mean yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearlySummary {
    pub year: String,
    pub area: f64,
    pub production: f64,
    #[serde(rename = "Yield")]
    pub mean_yield: f64,
}

/// A dense two-way table: one row per value of `row_dimension`, one column
/// per value of `column_dimension`. Cells without matching records hold 0.
///
/// The column set is only known at query time, so columns are an ordered
/// list of labels rather than struct fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub measure: Measure,
    pub aggregation: AggregationType,
    /// Column labels, in display order.
    pub columns: Vec<String>,
    pub rows: Vec<CrossTabRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub label: String,
    /// One value per entry of `CrossTab::columns`.
    pub values: Vec<f64>,
}

impl CrossTab {
    pub fn empty(
        row_dimension: Dimension,
        column_dimension: Dimension,
        measure: Measure,
        aggregation: AggregationType,
    ) -> Self {
        CrossTab {
            row_dimension,
            column_dimension,
            measure,
            aggregation,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    /// Looks up one cell by its row and column labels.
    pub fn value(&self, row_label: &str, column_label: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column_label)?;
        self.rows
            .iter()
            .find(|r| r.label == row_label)
            .and_then(|r| r.values.get(col).copied())
    }
}

/// One year of the district-vs-state yield comparison.
/// `state_yield` is `None` when the state-level series has no such year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrendPoint {
    pub year: String,
    pub district_yield: f64,
    pub state_yield: Option<f64>,
}

/// A state whose yield fell between its first and last year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YieldDecline {
    pub state: String,
    pub start_yield: f64,
    pub end_yield: f64,
    /// Percentage drop from start to end. Negative means yield rose.
    /// Infinite or NaN when the start yield is zero.
    pub decline_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeasonalTrend {
    pub state: String,
    pub district: String,
    pub season: String,
    pub year: String,
    pub area: f64,
    pub production: f64,
    #[serde(rename = "Yield")]
    pub mean_yield: f64,
}

// ============================================================================
// GENERIC RESULT TABLE
// ============================================================================

/// Display value for a result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultCell {
    Empty,
    Number(f64),
    Text(String),
}

impl From<f64> for ResultCell {
    fn from(value: f64) -> Self {
        ResultCell::Number(value)
    }
}

impl From<Option<f64>> for ResultCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ResultCell::Empty, ResultCell::Number)
    }
}

impl From<&str> for ResultCell {
    fn from(value: &str) -> Self {
        ResultCell::Text(value.to_string())
    }
}

impl ResultCell {
    pub fn text(s: impl Into<String>) -> Self {
        ResultCell::Text(s.into())
    }

    /// Returns the display value of the cell as a String.
    pub fn display_value(&self) -> String {
        match self {
            ResultCell::Empty => String::new(),
            ResultCell::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            ResultCell::Text(s) => s.clone(),
        }
    }
}

/// A named, rectangular table of display cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ResultCell>>,
}

impl ResultTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        ResultTable {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.headers.len()
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

/// Conversion of a typed query result into a `ResultTable`.
pub trait IntoResultTable {
    fn to_result_table(&self, name: &str) -> ResultTable;
}

impl IntoResultTable for CorrelationMatrix {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut header_row = vec![String::new()];
        header_row.extend(self.measures.iter().map(|m| m.column_name().to_string()));

        let mut table = ResultTable::new(name, header_row);
        for (i, measure) in self.measures.iter().enumerate() {
            let mut row = vec![ResultCell::text(measure.column_name())];
            row.extend(self.values[i].iter().map(|&v| ResultCell::Number(v)));
            table.rows.push(row);
        }
        table
    }
}

impl IntoResultTable for [DistrictProduction] {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut table = ResultTable::new(name, headers(&["District", "Production"]));
        table.rows = self
            .iter()
            .map(|r| vec![ResultCell::text(&r.district), r.production.into()])
            .collect();
        table
    }
}

impl IntoResultTable for [YieldAreaPoint] {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut table =
            ResultTable::new(name, headers(&["Area", "Yield", "Crop", "District", "Year"]));
        table.rows = self
            .iter()
            .map(|p| {
                vec![
                    p.area.into(),
                    p.crop_yield.into(),
                    ResultCell::text(&p.crop),
                    ResultCell::text(&p.district),
                    ResultCell::text(&p.year),
                ]
            })
            .collect();
        table
    }
}

impl IntoResultTable for [YearlySummary] {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut table = ResultTable::new(name, headers(&["Year", "Area", "Production", "Yield"]));
        table.rows = self
            .iter()
            .map(|s| {
                vec![
                    ResultCell::text(&s.year),
                    s.area.into(),
                    s.production.into(),
                    s.mean_yield.into(),
                ]
            })
            .collect();
        table
    }
}

impl IntoResultTable for CrossTab {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut header_row = vec![self.row_dimension.column_name().to_string()];
        header_row.extend(self.columns.iter().cloned());

        let mut table = ResultTable::new(name, header_row);
        for row in &self.rows {
            let mut cells = vec![ResultCell::text(&row.label)];
            cells.extend(row.values.iter().map(|&v| ResultCell::Number(v)));
            table.rows.push(cells);
        }
        table
    }
}

impl IntoResultTable for [TrendPoint] {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut table =
            ResultTable::new(name, headers(&["Year", "DistrictYield", "StateYield"]));
        table.rows = self
            .iter()
            .map(|p| {
                vec![
                    ResultCell::text(&p.year),
                    p.district_yield.into(),
                    p.state_yield.into(),
                ]
            })
            .collect();
        table
    }
}

impl IntoResultTable for [YieldDecline] {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut table = ResultTable::new(
            name,
            headers(&["State", "StartYield", "EndYield", "DeclinePct"]),
        );
        table.rows = self
            .iter()
            .map(|d| {
                vec![
                    ResultCell::text(&d.state),
                    d.start_yield.into(),
                    d.end_yield.into(),
                    d.decline_pct.into(),
                ]
            })
            .collect();
        table
    }
}

impl IntoResultTable for [SeasonalTrend] {
    fn to_result_table(&self, name: &str) -> ResultTable {
        let mut table = ResultTable::new(
            name,
            headers(&["State", "District", "Season", "Year", "Area", "Production", "Yield"]),
        );
        table.rows = self
            .iter()
            .map(|t| {
                vec![
                    ResultCell::text(&t.state),
                    ResultCell::text(&t.district),
                    ResultCell::text(&t.season),
                    ResultCell::text(&t.year),
                    t.area.into(),
                    t.production.into(),
                    t.mean_yield.into(),
                ]
            })
            .collect();
        table
    }
}
