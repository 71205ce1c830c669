//! Delta Lake access for bronze tables.
//!
//! - **truncate**: delete every object of an existing table
//! - **writer**: append a batch with schema merge and by-name alignment
//! - **read**: read the current version back (previews, checks)
//!
//! Tables are addressed by [`bronze_common::StorageLocation`], so the same
//! code writes to Azure Data Lake Gen2 and to local `file://` directories.

mod error;
mod read;
mod schema;
mod table;
mod truncate;
mod writer;

pub use error::{DeltaError, Result};
pub use read::{TableContents, count_rows, read_table};
pub use schema::{SchemaMerge, align_batch, merge_schema};
pub use table::{
    TableOptions, arrow_schema_to_delta, create_table, ensure_handlers_registered, open_table,
};
pub use truncate::{DELTA_LOG_DIR, TruncateOutcome, is_delta_table, truncate_table};
pub use writer::{WriteOutcome, write_batch};
