//! Error types for bronze Delta table operations.

use deltalake::DeltaTableError;
use deltalake::arrow::error::ArrowError;
use deltalake::parquet::errors::ParquetError;
use thiserror::Error;

use bronze_common::StorageError;

/// Errors that can occur while truncating, writing or reading a bronze table.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// Listing, reading or deleting table objects failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A Delta Lake operation failed.
    #[error("delta {operation} failed: {source}")]
    Delta {
        operation: &'static str,
        #[source]
        source: DeltaTableError,
    },

    /// No Delta table exists at the location.
    #[error("no Delta table at {location}")]
    TableNotFound { location: String },

    /// Converting between Arrow and Delta schemas failed.
    #[error("failed to convert schema: {source}")]
    SchemaConversion {
        #[source]
        source: ArrowError,
    },

    /// Building a Delta struct type failed.
    #[error("invalid table schema: {message}")]
    StructType { message: String },

    /// A batch column has a different type than the same table column.
    #[error("column '{column}' is {table_type} in the table but {batch_type} in the batch")]
    TypeConflict {
        column: String,
        table_type: String,
        batch_type: String,
    },

    /// A non-nullable table column has no values in the batch.
    #[error("table column '{column}' is required but missing from the batch")]
    MissingRequiredColumn { column: String },

    /// Arrow rejected a batch while aligning it to the table.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Encoding or decoding a Parquet data file failed.
    #[error("parquet error for {path}: {source}")]
    Parquet {
        path: String,
        #[source]
        source: ParquetError,
    },
}

impl DeltaError {
    pub(crate) fn delta(operation: &'static str) -> impl FnOnce(DeltaTableError) -> Self {
        move |source| Self::Delta { operation, source }
    }

    /// Check if this error means there is no Delta table at the location.
    pub fn is_table_not_found(&self) -> bool {
        matches!(
            self,
            Self::TableNotFound { .. }
                | Self::Delta {
                    source: DeltaTableError::NotATable(_)
                        | DeltaTableError::InvalidTableLocation(_),
                    ..
                }
        )
    }
}

/// Result type for Delta operations.
pub type Result<T> = std::result::Result<T, DeltaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_table_not_found() {
        let err = DeltaError::Delta {
            operation: "open",
            source: DeltaTableError::NotATable("no log".to_string()),
        };
        assert!(err.is_table_not_found());

        let err = DeltaError::MissingRequiredColumn {
            column: "HASH_KEY".to_string(),
        };
        assert!(!err.is_table_not_found());
    }

    #[test]
    fn test_type_conflict_display() {
        let err = DeltaError::TypeConflict {
            column: "GMT".to_string(),
            table_type: "long".to_string(),
            batch_type: "string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "column 'GMT' is long in the table but string in the batch"
        );
    }
}
