//! FILENAME: persistence/src/lib.rs
//! Crop Statistics Persistence Module
//!
//! Loads crop datasets from CSV and XLSX files into a `CropTable`, and
//! exports query results (`ResultTable`) to XLSX workbooks or CSV.

mod csv_reader;
mod csv_writer;
mod error;
mod xlsx_reader;
mod xlsx_writer;

pub use csv_reader::load_csv;
pub use csv_writer::{save_results_csv, write_results_csv};
pub use error::PersistenceError;
pub use xlsx_reader::load_xlsx;
pub use xlsx_writer::save_results_xlsx;

use engine::CropTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// COLUMN LAYOUT
// ============================================================================

/// Header names every dataset must provide. Other columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "State",
    "District",
    "Crop",
    "Season",
    "Year",
    "Area",
    "Production",
    "Yield",
];

// ============================================================================
// LOAD OPTIONS
// ============================================================================

/// Options controlling how a dataset file is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Field delimiter for CSV sources.
    pub delimiter: u8,
    /// Trim surrounding whitespace from headers and text fields.
    pub trim: bool,
    /// Worksheet to read from XLSX sources. `None` reads the first sheet.
    pub sheet_name: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: b',',
            trim: true,
            sheet_name: None,
        }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Loads a dataset, choosing the reader from the file extension.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<CropTable, PersistenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") | Some("txt") => load_csv(path, options),
        Some("xlsx") | Some("xlsm") => load_xlsx(path, options),
        _ => Err(PersistenceError::InvalidFormat(format!(
            "Unsupported dataset file: {}",
            path.display()
        ))),
    }
}
