//! FILENAME: persistence/src/csv_writer.rs

use crate::PersistenceError;
use query_engine::ResultTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes one result table as CSV: a header row, then one line per row.
/// Empty cells become empty fields.
pub fn write_results_csv<W: Write>(
    table: &ResultTable,
    output: W,
) -> Result<(), PersistenceError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.display_value()))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Writes one result table to a CSV file at `path`.
pub fn save_results_csv(table: &ResultTable, path: &Path) -> Result<(), PersistenceError> {
    let file = File::create(path).map_err(|e| PersistenceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    write_results_csv(table, file)?;
    log::info!("[SAVE] '{}' ({} rows) to {}", table.name, table.row_count(), path.display());
    Ok(())
}
