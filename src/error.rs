//! Error handling for the harvest planner
//!
//! Defines the typed input errors and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Errors raised while reading and validating a holdings report
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("missing expected column '{column}'")]
    MissingColumn { column: String },

    #[error("header row not found: no line contains the '{column}' column")]
    HeaderNotFound { column: String },

    #[error("invalid number in column '{column}' at row {row}: '{value}'")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("amount out of range in column '{column}' at row {row}: '{value}'")]
    AmountOutOfRange {
        column: String,
        row: usize,
        value: String,
    },

    #[error("negative market value for {symbol} at row {row}: {value}")]
    NegativeMarketValue {
        row: usize,
        symbol: String,
        value: String,
    },

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for harvest operations
pub type Result<T> = anyhow::Result<T>;
