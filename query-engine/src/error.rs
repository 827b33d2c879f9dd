//! FILENAME: query-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid argument: a crop is required for yield decline detection")]
    MissingCrop,

    #[error("Invalid argument: decline threshold must be a number, got {0}")]
    InvalidThreshold(f64),

    #[error("Invalid query configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
