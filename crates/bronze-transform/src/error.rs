//! Error types for bronze batch transformation.

use deltalake::arrow::error::ArrowError;
use thiserror::Error;

use bronze_ingest::IngestError;

/// Errors that can occur while building a bronze batch.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading values out of a landing frame failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Arrow rejected an array or record batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// A column required by a transformation is not in the batch.
    #[error("column '{column}' not found in batch")]
    ColumnNotFound { column: String },

    /// A column has an Arrow type that cannot be rendered for hashing.
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    /// Hashing was asked to combine no columns.
    #[error("no columns given for {0}")]
    NoHashColumns(&'static str),
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;
