//! Physical truncation of a Delta table.

use bronze_common::{Storage, StorageLocation};
use tracing::{debug, info};

use crate::error::Result;

/// Directory holding the Delta transaction log.
pub const DELTA_LOG_DIR: &str = "_delta_log";

/// What a truncation found at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncateOutcome {
    /// No Delta table existed; nothing was deleted.
    NotATable,
    /// The table existed and `deleted` objects were removed.
    Truncated { deleted: usize },
}

impl TruncateOutcome {
    pub fn deleted(&self) -> usize {
        match self {
            Self::NotATable => 0,
            Self::Truncated { deleted } => *deleted,
        }
    }
}

/// A Delta table exists when its `_delta_log/` holds at least one object.
pub async fn is_delta_table(storage: &Storage) -> Result<bool> {
    let log = storage.qualify(DELTA_LOG_DIR);
    Ok(storage.has_objects(&log).await?)
}

/// Deletes every object under `location` if a Delta table lives there.
///
/// Data files go first and log entries last, so an interrupted truncation
/// still leaves a directory that reads as a table.
pub async fn truncate_table(location: &StorageLocation) -> Result<TruncateOutcome> {
    let storage = Storage::open(location)?;
    if !is_delta_table(&storage).await? {
        info!(location = %location, "no Delta table found; no truncation performed");
        return Ok(TruncateOutcome::NotATable);
    }

    let log = storage.qualify(DELTA_LOG_DIR);
    let (log_objects, data_objects): (Vec<_>, Vec<_>) = storage
        .list_all(storage.root())
        .await?
        .into_iter()
        .partition(|meta| meta.location.prefix_matches(&log));

    let mut deleted = 0;
    for meta in data_objects.iter().chain(&log_objects) {
        debug!(path = %meta.location, "deleting table object");
        storage.delete(&meta.location).await?;
        deleted += 1;
    }

    info!(location = %location, deleted, "Delta table truncated");
    Ok(TruncateOutcome::Truncated { deleted })
}
