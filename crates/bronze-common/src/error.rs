use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving or accessing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cannot express local path {path} as a URL")]
    LocalPath { path: PathBuf },

    #[error("storage {operation} failed for {path}: {source}")]
    ObjectStore {
        operation: &'static str,
        path: String,
        #[source]
        source: object_store::Error,
    },
}

impl StorageError {
    pub(crate) fn object_store(
        operation: &'static str,
        path: impl ToString,
        source: object_store::Error,
    ) -> Self {
        Self::ObjectStore {
            operation,
            path: path.to_string(),
            source,
        }
    }

    /// Check if this error represents a missing object or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ObjectStore {
                source: object_store::Error::NotFound { .. },
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
