//! Data model for the landing-to-bronze pipeline.
//!
//! Types in this crate describe *what* gets loaded: the logical column
//! types, the per-instance schema manifest (source columns, business keys,
//! tracked attributes) and the metadata columns every bronze row carries.

pub mod columns;
pub mod error;
pub mod instance;
pub mod schema;
pub mod types;

pub use columns::{
    DeliveryMode, FILE_PATH, HASH_KEY, HASH_VALUE, LOAD_TYPE, METADATA_COLUMNS,
    ORIGINAL_FILE_NAME, RECORD_ID, RSRC,
};
pub use error::{ModelError, Result};
pub use instance::{InstanceDefinition, builtin_instance, builtin_instance_names};
pub use schema::{ColumnSpec, TableSchema};
pub use types::DataType;
