//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the crop statistics engine.
//! CONTEXT: Re-exports the record model and the filter engine for use by
//! the query and persistence crates.

pub mod filter;
pub mod record;
pub mod table;

// Re-export commonly used types at the crate root
pub use filter::{apply_filters, FilterSelection, ValueSet};
pub use record::{CropRecord, Dimension, Measure};
pub use table::CropTable;
