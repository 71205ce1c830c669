//! Storage plumbing shared by the ingest and Delta crates.
//!
//! A [`StorageLocation`] names a directory (local or Azure Data Lake Gen2)
//! plus the options needed to reach it; [`Storage`] opens it as an
//! `object_store` rooted at that directory.

mod error;
mod location;
mod storage;

pub use error::{Result, StorageError};
pub use location::{StorageLocation, adls_url};
pub use storage::Storage;

pub use object_store::ObjectMeta;
pub use object_store::path::Path as ObjectPath;
