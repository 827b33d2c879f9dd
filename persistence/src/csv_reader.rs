//! FILENAME: persistence/src/csv_reader.rs
//! CSV dataset loader.
//!
//! Rows are deserialized with serde by header name, so column order does not
//! matter and extra columns (units, notes) are ignored. A blank numeric cell
//! loads as NaN; any other unparseable value fails the load with its line.

use crate::{LoadOptions, PersistenceError, REQUIRED_COLUMNS};
use engine::{CropRecord, CropTable};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One CSV row, matched to columns by header name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CropRow {
    state: String,
    district: String,
    crop: String,
    season: String,
    year: String,
    area: Option<f64>,
    production: Option<f64>,
    #[serde(rename = "Yield")]
    crop_yield: Option<f64>,
}

impl CropRow {
    fn into_record(self) -> CropRecord {
        CropRecord::new(self.state, self.district, self.crop, self.season, self.year)
            .with_measures(
                self.area.unwrap_or(f64::NAN),
                self.production.unwrap_or(f64::NAN),
                self.crop_yield.unwrap_or(f64::NAN),
            )
    }
}

/// Loads a crop dataset from a CSV file with a header row.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<CropTable, PersistenceError> {
    let path_str = path.display().to_string();

    let file = File::open(path).map_err(|e| PersistenceError::Io {
        path: path_str.clone(),
        source: e,
    })?;

    let table = read_csv(file, options, &path_str)?;
    log::info!("[LOAD] {} rows from {}", table.len(), path_str);
    Ok(table)
}

/// Parses CSV from any reader. `source` names the input in error messages.
pub(crate) fn read_csv<R: Read>(
    input: R,
    options: &LoadOptions,
    source: &str,
) -> Result<CropTable, PersistenceError> {
    let trim = if options.trim {
        csv::Trim::All
    } else {
        csv::Trim::None
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .trim(trim)
        .from_reader(input);

    let headers = reader.headers().map_err(|e| PersistenceError::Csv {
        path: source.to_string(),
        line: 1,
        source: e,
    })?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(PersistenceError::MissingColumn {
            path: source.to_string(),
            column: missing.to_string(),
        });
    }

    let mut table = CropTable::new();
    // Line 1 is the header, data starts at line 2
    for (index, result) in reader.deserialize::<CropRow>().enumerate() {
        let row = result.map_err(|e| {
            let line = e.position().map_or(index as u64 + 2, |p| p.line());
            PersistenceError::Csv {
                path: source.to_string(),
                line,
                source: e,
            }
        })?;
        table.push(row.into_record());
    }

    Ok(table)
}
