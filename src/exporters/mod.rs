// Export module - CSV writers for the planned holdings table

pub mod stocks_csv;

pub use stocks_csv::{export_stocks_csv, write_stocks_csv};
