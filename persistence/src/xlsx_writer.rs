//! FILENAME: persistence/src/xlsx_writer.rs

use crate::PersistenceError;
use query_engine::{ResultCell, ResultTable};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Saves each result table to its own worksheet, headers in bold.
pub fn save_results_xlsx(tables: &[ResultTable], path: &Path) -> Result<(), PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();
    let mut used_names: Vec<String> = Vec::new();

    for (index, table) in tables.iter().enumerate() {
        let name = unique_sheet_name(&table.name, index, &used_names);
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&name)?;
        used_names.push(name);

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, row_num, col as u16, cell)?;
            }
        }
    }

    // A workbook needs at least one sheet
    if tables.is_empty() {
        xlsx.add_worksheet();
    }

    xlsx.save(path)?;
    log::info!("[SAVE] {} result tables to {}", tables.len(), path.display());
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &ResultCell,
) -> Result<(), PersistenceError> {
    match cell {
        ResultCell::Empty => {}
        ResultCell::Number(n) if n.is_finite() => {
            worksheet.write_number(row, col, *n)?;
        }
        // Excel has no NaN or infinity; keep the value visible as text
        ResultCell::Number(n) => {
            worksheet.write_string(row, col, non_finite_label(*n))?;
        }
        ResultCell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}

fn non_finite_label(n: f64) -> &'static str {
    if n.is_nan() {
        "NaN"
    } else if n > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Makes `name` a valid worksheet name that differs (case-insensitively)
/// from every entry of `used`.
fn unique_sheet_name(name: &str, index: usize, used: &[String]) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();

    let mut base = fit_sheet_name(&cleaned, MAX_SHEET_NAME_LEN);
    if base.is_empty() {
        base = format!("Sheet{}", index + 1);
    }

    let is_used = |candidate: &str| used.iter().any(|u| u.eq_ignore_ascii_case(candidate));
    if !is_used(&base) {
        return base;
    }

    let mut suffix = 2;
    loop {
        let tag = format!(" ({})", suffix);
        let stem = fit_sheet_name(&base, MAX_SHEET_NAME_LEN - tag.len());
        let candidate = format!("{}{}", stem, tag);
        if !is_used(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Cuts `name` to `max_len` characters, then strips surrounding whitespace
/// and apostrophes. A sheet name may not start or end with an apostrophe.
fn fit_sheet_name(name: &str, max_len: usize) -> String {
    let truncated: String = name.chars().take(max_len).collect();
    truncated
        .trim_matches(|c: char| c == '\'' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn sample_table(name: &str) -> ResultTable {
        let mut table = ResultTable::new(
            name,
            vec!["District".to_string(), "Production".to_string()],
        );
        table.rows.push(vec![ResultCell::text("AURANGABAD"), ResultCell::Number(417324.0)]);
        table.rows.push(vec![ResultCell::text("BANKA"), ResultCell::Number(f64::NAN)]);
        table.rows.push(vec![ResultCell::text("ARARIA"), ResultCell::Empty]);
        table
    }

    #[test]
    fn test_save_results_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.xlsx");
        let tables = vec![sample_table("Top Producing Districts"), sample_table("Second")];

        save_results_xlsx(&tables, &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec!["Top Producing Districts".to_string(), "Second".to_string()]
        );

        let range = workbook.worksheet_range("Top Producing Districts").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("District".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(417324.0)));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("NaN".to_string())));
        assert_eq!(range.get_value((3, 1)), Some(&Data::Empty));
    }

    #[test]
    fn test_save_empty_result_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        save_results_xlsx(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unique_sheet_name() {
        let used = vec!["Yield".to_string()];

        assert_eq!(unique_sheet_name("Yield/Area [t]", 0, &used), "Yield_Area _t_");
        assert_eq!(unique_sheet_name("YIELD", 1, &used), "YIELD (2)");
        assert_eq!(unique_sheet_name("  ", 4, &used), "Sheet5");

        let long = "A".repeat(40);
        assert_eq!(unique_sheet_name(&long, 0, &[]).len(), MAX_SHEET_NAME_LEN);
        let taken = vec!["A".repeat(31)];
        let renamed = unique_sheet_name(&long, 0, &taken);
        assert_eq!(renamed.len(), MAX_SHEET_NAME_LEN);
        assert!(renamed.ends_with(" (2)"));
    }

    #[test]
    fn test_sheet_name_apostrophe_at_cut() {
        let name = format!("{}'B", "A".repeat(30));
        assert_eq!(unique_sheet_name(&name, 0, &[]), "A".repeat(30));

        let taken = vec!["A".repeat(30)];
        let renamed = unique_sheet_name(&name, 0, &taken);
        assert_eq!(renamed, format!("{} (2)", "A".repeat(27)));

        let quoted = format!("'{}'", "Q".repeat(5));
        assert_eq!(unique_sheet_name(&quoted, 0, &[]), "QQQQQ");
    }

    #[test]
    fn test_save_results_with_apostrophe_at_cut() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.xlsx");
        let name = format!("{}'B", "A".repeat(30));

        save_results_xlsx(&[sample_table(&name)], &path).unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names().to_vec(), vec!["A".repeat(30)]);
    }
}
