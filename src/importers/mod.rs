// Import module - brokerage holdings report parsers

pub mod unrealized_csv;

use anyhow::anyhow;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub use unrealized_csv::{ColumnIndices, HoldingsTable};

/// Import a holdings report, choosing the parser from the file extension.
///
/// Files without an extension are read as CSV.
pub fn import_file<P: AsRef<Path>>(file_path: P, config: &Config) -> Result<HoldingsTable> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "csv".to_string());

    info!("Importing holdings file: {:?} (type: {})", path, extension);

    match extension.as_str() {
        "csv" | "txt" => unrealized_csv::read_unrealized(path, config),
        _ => Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .csv, .txt",
            extension
        )),
    }
}
