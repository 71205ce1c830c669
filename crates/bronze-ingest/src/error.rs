//! Error types for landing zone ingestion.

use thiserror::Error;

use bronze_common::StorageError;

/// Errors that can occur during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Storage Errors ===
    /// Listing or reading the landing zone failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: String, message: String },

    /// Failed to detect a valid header row.
    #[error("could not detect header row in {path}")]
    NoHeaderDetected { path: String },

    /// File is not valid UTF-8 text.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: String,
        encoding: &'static str,
    },

    // === DataFrame Errors ===
    /// Column exists in the frame but is not string typed.
    #[error("column '{column}' in {path} is not a string column")]
    ColumnType { column: String, path: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
