//! CSV reading utilities.

mod header;
mod reader;

pub use header::CsvHeaders;
pub use reader::{CsvOptions, LandingBatch, LandingTable, load_landing_files, parse_csv_bytes};
