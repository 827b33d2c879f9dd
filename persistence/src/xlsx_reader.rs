//! FILENAME: persistence/src/xlsx_reader.rs
//! XLSX dataset loader.
//!
//! The first row of the sheet is the header. Required columns are located by
//! name, so column order does not matter. Numeric cells may hold numbers or
//! numeric text; blank numeric cells load as NaN.

use crate::{LoadOptions, PersistenceError, REQUIRED_COLUMNS};
use calamine::{Data, Reader, Xlsx};
use engine::{CropRecord, CropTable};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

static EMPTY: Data = Data::Empty;

/// Loads a crop dataset from an XLSX workbook.
pub fn load_xlsx(path: &Path, options: &LoadOptions) -> Result<CropTable, PersistenceError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|e| PersistenceError::Io {
        path: path_str.clone(),
        source: e,
    })?;
    let mut workbook = Xlsx::new(BufReader::new(file))?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match &options.sheet_name {
        Some(name) => {
            if !sheet_names.contains(name) {
                return Err(PersistenceError::SheetNotFound(name.clone()));
            }
            name.clone()
        }
        None => sheet_names.first().cloned().ok_or_else(|| {
            PersistenceError::InvalidFormat("Workbook contains no sheets".to_string())
        })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header = rows.next().ok_or_else(|| {
        PersistenceError::InvalidFormat(format!("Sheet '{}' is empty", sheet_name))
    })?;
    let header_text: Vec<String> = header.iter().map(|cell| cell_text(cell, true)).collect();

    // Column index of each required column, in REQUIRED_COLUMNS order
    let mut columns = [0usize; 8];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
        *slot = header_text
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PersistenceError::MissingColumn {
                path: path_str.clone(),
                column: name.to_string(),
            })?;
    }

    let mut table = CropTable::new();
    table.reserve(range.height().saturating_sub(1));
    for (index, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let line = index as u64 + 2;
        let cell = |slot: usize| row.get(columns[slot]).unwrap_or(&EMPTY);
        let text = |slot: usize| cell_text(cell(slot), options.trim);
        let number = |slot: usize| {
            cell_number(cell(slot)).ok_or_else(|| PersistenceError::InvalidNumber {
                path: path_str.clone(),
                line,
                column: REQUIRED_COLUMNS[slot].to_string(),
                value: cell_text(cell(slot), false),
            })
        };

        let record = CropRecord::new(text(0), text(1), text(2), text(3), text(4))
            .with_measures(number(5)?, number(6)?, number(7)?);
        table.push(record);
    }

    log::info!(
        "[LOAD] {} rows from {} (sheet '{}')",
        table.len(),
        path_str,
        sheet_name
    );

    Ok(table)
}

/// Text of a categorical cell. Whole numbers print without a decimal part so
/// a numeric year such as 2001 reads back as "2001".
fn cell_text(cell: &Data, trim: bool) -> String {
    let text = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("{:?}", e),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    };

    if trim {
        text.trim().to_string()
    } else {
        text
    }
}

/// Value of a numeric cell. Blank cells are NaN; `None` means the cell
/// holds something that is not a number.
fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Empty => Some(f64::NAN),
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(f64::NAN)
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Writes `rows` below `headers` on a sheet named `sheet`.
    fn write_workbook(path: &Path, sheet: &str, headers: &[&str], rows: &[Vec<Data>]) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            let row_num = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Data::String(s) => {
                        worksheet.write_string(row_num, col as u16, s).unwrap();
                    }
                    Data::Float(f) => {
                        worksheet.write_number(row_num, col as u16, *f).unwrap();
                    }
                    _ => {}
                }
            }
        }
        workbook.save(path).unwrap();
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_load_xlsx_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crops.xlsx");
        // Columns deliberately out of order, with an extra units column
        write_workbook(
            &path,
            "Data",
            &[
                "Year",
                "State",
                "District",
                "Crop",
                "Season",
                "Area",
                "Area Units",
                "Production",
                "Yield",
            ],
            &[
                vec![
                    text("2001-02"),
                    text("Bihar"),
                    text("ARARIA"),
                    text("Barley"),
                    text("Rabi"),
                    Data::Float(20.0),
                    text("Hectare"),
                    Data::Float(25.0),
                    Data::Float(1.25),
                ],
                vec![
                    text("2004-05"),
                    text("Bihar"),
                    text("BANKA"),
                    text("Wheat"),
                    text("Rabi"),
                    text("21538"),
                    text("Hectare"),
                    Data::Float(27735.0),
                    Data::Empty,
                ],
            ],
        );

        let table = load_xlsx(&path, &LoadOptions::default()).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.state, "Bihar");
        assert_eq!(first.year, "2001-02");
        assert_eq!(first.production, 25.0);
        let second = &table.records()[1];
        assert_eq!(second.area, 21538.0);
        assert!(second.crop_yield.is_nan());
    }

    #[test]
    fn test_numeric_year_reads_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("years.xlsx");
        write_workbook(
            &path,
            "Sheet1",
            &REQUIRED_COLUMNS,
            &[vec![
                text("Bihar"),
                text("ARARIA"),
                text("Wheat"),
                text("Rabi"),
                Data::Float(2001.0),
                Data::Float(1.0),
                Data::Float(2.0),
                Data::Float(2.0),
            ]],
        );

        let table = load_xlsx(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.records()[0].year, "2001");
    }

    #[test]
    fn test_invalid_number_reports_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        write_workbook(
            &path,
            "Sheet1",
            &REQUIRED_COLUMNS,
            &[vec![
                text("Bihar"),
                text("ARARIA"),
                text("Wheat"),
                text("Rabi"),
                text("2001-02"),
                text("n/a"),
                Data::Float(2.0),
                Data::Float(2.0),
            ]],
        );

        match load_xlsx(&path, &LoadOptions::default()) {
            Err(PersistenceError::InvalidNumber { line, column, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "Area");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected invalid number, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_and_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.xlsx");
        write_workbook(&path, "Sheet1", &["State", "District"], &[]);

        let missing = load_xlsx(&path, &LoadOptions::default());
        assert!(matches!(
            missing,
            Err(PersistenceError::MissingColumn { ref column, .. }) if column == "Crop"
        ));

        let options = LoadOptions::default().with_sheet_name("Other");
        let no_sheet = load_xlsx(&path, &options);
        assert!(matches!(no_sheet, Err(PersistenceError::SheetNotFound(ref s)) if s == "Other"));
    }

    #[test]
    fn test_load_xlsx_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xlsx");

        match load_xlsx(&path, &LoadOptions::default()) {
            Err(PersistenceError::Io { path: reported, .. }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("expected IO error, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_number_parsing() {
        assert_eq!(cell_number(&Data::Int(7)), Some(7.0));
        assert_eq!(cell_number(&text(" 1.5 ")), Some(1.5));
        assert!(cell_number(&text("")).unwrap().is_nan());
        assert_eq!(cell_number(&Data::Bool(true)), None);
    }
}
