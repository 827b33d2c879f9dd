//! FILENAME: persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line} in {path}: {source}")]
    Csv {
        path: String,
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("CSV write error: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: String, column: String },

    #[error("Invalid number '{value}' in column '{column}' at line {line} in {path}")]
    InvalidNumber {
        path: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}
