use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading the data model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid column type '{value}': {reason}")]
    InvalidType { value: String, reason: String },

    #[error("unknown delivery mode '{value}' (expected FULL or DELTA)")]
    InvalidDeliveryMode { value: String },

    #[error("duplicate column '{column}' in schema")]
    DuplicateColumn { column: String },

    #[error("{role} column '{column}' is not declared in the schema of {instance}")]
    UndeclaredColumn {
        instance: String,
        role: &'static str,
        column: String,
    },

    #[error("column '{column}' collides with a bronze metadata column")]
    ReservedColumn { column: String },

    #[error("instance {instance} declares no {what}")]
    Empty {
        instance: String,
        what: &'static str,
    },

    #[error("no built-in manifest for instance '{name}'")]
    UnknownInstance { name: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
