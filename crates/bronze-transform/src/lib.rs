//! Bronze batch transformation.
//!
//! Turns the string-typed landing frames of a run into one typed Arrow
//! batch and enriches it for the bronze layer:
//!
//! - **cast**: by-name schema application with permissive parsing
//! - **metadata**: lineage and load columns (`file_path`, `RECORD_ID`, ...)
//! - **hash**: `HASH_KEY` over business keys, `HASH_VALUE` over attributes
//!
//! Hashes are computed over the canonical string form of each cell (see
//! [`canonical`]), so a digest can be recomputed from the table contents.

pub mod batch;
pub mod canonical;
pub mod cast;
pub mod error;
pub mod hash;
pub mod metadata;
pub mod parse;

pub use batch::{SourceSpan, TypedBatch, arrow_field, arrow_schema, arrow_type};
pub use cast::{CastReport, apply_schema};
pub use error::{Result, TransformError};
pub use hash::{add_hash_columns, attribute_hash, business_key_hash, md5_hex};
pub use metadata::{MetadataValues, add_metadata_columns};
