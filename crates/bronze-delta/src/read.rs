//! Reading bronze tables back for previews and checks.

use std::sync::Arc;

use deltalake::arrow::datatypes::SchemaRef;
use deltalake::arrow::record_batch::RecordBatch;
use deltalake::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use bronze_common::{Storage, StorageLocation};

use crate::error::{DeltaError, Result};
use crate::schema::align_batch;
use crate::table::{open_table, table_arrow_schema};
use crate::truncate::is_delta_table;

/// Rows read from the current version of a table.
#[derive(Debug, Clone)]
pub struct TableContents {
    pub version: i64,
    pub schema: SchemaRef,
    /// Batches aligned to the table schema.
    pub batches: Vec<RecordBatch>,
}

impl TableContents {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Reads the current table version, stopping after `limit` rows when given.
pub async fn read_table(
    location: &StorageLocation,
    limit: Option<usize>,
) -> Result<TableContents> {
    let storage = Storage::open(location)?;
    if !is_delta_table(&storage).await? {
        return Err(DeltaError::TableNotFound {
            location: location.to_string(),
        });
    }
    let table = open_table(location).await?;
    let schema = Arc::new(table_arrow_schema(&table)?);

    let mut files: Vec<String> = table
        .get_file_uris()
        .map_err(DeltaError::delta("list files"))?
        .collect();
    files.sort();

    let mut batches = Vec::new();
    let mut remaining = limit.unwrap_or(usize::MAX);
    'files: for uri in files {
        let relative = relative_file(location, &uri);
        debug!(file = %relative, "reading data file");
        let bytes = storage.get(&storage.qualify(&relative)).await?;

        let parquet_error = |source| DeltaError::Parquet {
            path: uri.clone(),
            source,
        };
        let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
            .map_err(parquet_error)?
            .build()
            .map_err(parquet_error)?;

        for batch in reader {
            if remaining == 0 {
                break 'files;
            }
            let batch = align_batch(&batch?, &schema)?;
            let take = remaining.min(batch.num_rows());
            batches.push(batch.slice(0, take));
            remaining -= take;
        }
    }

    Ok(TableContents {
        version: table.version().unwrap_or(-1),
        schema,
        batches,
    })
}

/// Number of rows in the current table version.
pub async fn count_rows(location: &StorageLocation) -> Result<usize> {
    Ok(read_table(location, None).await?.num_rows())
}

/// Path of a data file relative to the table root.
fn relative_file(location: &StorageLocation, uri: &str) -> String {
    let root = location.url().as_str();
    match uri.strip_prefix(root) {
        Some(relative) => relative.to_string(),
        None => uri.rsplit('/').next().unwrap_or(uri).to_string(),
    }
}
