//! Landing zone ingestion.
//!
//! This crate finds the CSV files delivered for an instance and parses them
//! into string-typed Polars DataFrames, one per file, keeping track of which
//! file every row came from.
//!
//! # Features
//!
//! - **Discovery**: CSV files in the landing folder and its immediate subfolders
//! - **CSV Loading**: delimiter-aware parsing with a header row
//! - **Lineage**: each loaded frame keeps its source file
//!
//! # Example
//!
//! ```ignore
//! use bronze_common::{Storage, StorageLocation};
//! use bronze_ingest::{CsvOptions, discover_csv_files, load_landing_files};
//!
//! let storage = Storage::open(&StorageLocation::local("landing/AIRPORTS".as_ref())?)?;
//! if let Some(files) = discover_csv_files(&storage).await? {
//!     let batch = load_landing_files(&storage, &files, &CsvOptions::default()).await?;
//!     println!("{} rows", batch.row_count());
//! }
//! ```

mod csv;
mod discovery;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{
    CsvHeaders, CsvOptions, LandingBatch, LandingTable, load_landing_files, parse_csv_bytes,
};

// === File Discovery ===
pub use discovery::{LandingFile, LandingFiles, discover_csv_files, landing_location};
