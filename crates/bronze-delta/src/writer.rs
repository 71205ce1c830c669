//! Appending record batches to a bronze Delta table.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use deltalake::DeltaTable;
use deltalake::arrow::record_batch::RecordBatch;
use deltalake::kernel::transaction::CommitBuilder;
use deltalake::kernel::{Action, Add};
use deltalake::parquet::arrow::ArrowWriter;
use deltalake::protocol::{DeltaOperation, SaveMode};
use tracing::{debug, info};
use uuid::Uuid;

use bronze_common::{Storage, StorageLocation};

use crate::error::{DeltaError, Result};
use crate::schema::{align_batch, commit_schema, merge_schema};
use crate::table::{
    TableOptions, arrow_schema_to_delta, create_table, open_table, table_arrow_schema,
    table_delta_schema,
};
use crate::truncate::is_delta_table;

/// What an append changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Table version of the data commit.
    pub version: i64,
    pub rows: usize,
    /// Data file path relative to the table root.
    pub data_file: String,
    /// True when the table did not exist before this write.
    pub created: bool,
    /// Columns merged into an existing table schema.
    pub added_columns: Vec<String>,
}

/// Appends `batch` to the table at `location`, creating it when absent.
///
/// Batch columns are merged into the table schema and then aligned to it by
/// name, so column order in the batch does not matter.
pub async fn write_batch(
    location: &StorageLocation,
    batch: &RecordBatch,
    options: &TableOptions,
) -> Result<WriteOutcome> {
    let storage = Storage::open(location)?;

    let created = !is_delta_table(&storage).await?;
    let mut table = if created {
        create_table(location, batch.schema().as_ref(), options).await?
    } else {
        open_table(location).await?
    };

    let added_columns = if created {
        Vec::new()
    } else {
        let incoming = arrow_schema_to_delta(batch.schema().as_ref())?;
        let merge = merge_schema(&table_delta_schema(&table)?, &incoming)?;
        if let Some(merged) = &merge.merged {
            info!(columns = ?merge.added, "adding new columns to table schema");
            commit_schema(&mut table, merged).await?;
        }
        merge.added
    };

    let aligned = align_batch(batch, &table_arrow_schema(&table)?)?;
    let data_file = format!("part-00000-{}-c000.parquet", Uuid::new_v4());
    let encoded = encode_parquet(&aligned, &data_file)?;
    let size = encoded.len();
    storage.put(&storage.qualify(&data_file), encoded).await?;
    debug!(file = %data_file, bytes = size, rows = aligned.num_rows(), "data file uploaded");

    let version = commit_add(&mut table, &data_file, size).await?;
    info!(
        location = %location,
        version,
        rows = aligned.num_rows(),
        "batch appended to Delta table"
    );

    Ok(WriteOutcome {
        version,
        rows: aligned.num_rows(),
        data_file,
        created,
        added_columns,
    })
}

fn encode_parquet(batch: &RecordBatch, path: &str) -> Result<Bytes> {
    let parquet_error = |source| DeltaError::Parquet {
        path: path.to_string(),
        source,
    };

    let mut buffer = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buffer, batch.schema(), None).map_err(parquet_error)?;
    writer.write(batch).map_err(parquet_error)?;
    writer.close().map_err(parquet_error)?;
    Ok(Bytes::from(buffer))
}

async fn commit_add(table: &mut DeltaTable, data_file: &str, size: usize) -> Result<i64> {
    let add = Action::Add(Add {
        path: data_file.to_string(),
        size: i64::try_from(size).unwrap_or(i64::MAX),
        partition_values: HashMap::new(),
        modification_time: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0),
        data_change: true,
        ..Default::default()
    });

    let version = CommitBuilder::default()
        .with_actions(vec![add])
        .build(
            Some(table.snapshot().map_err(DeltaError::delta("snapshot"))?),
            table.log_store(),
            DeltaOperation::Write {
                mode: SaveMode::Append,
                partition_by: None,
                predicate: None,
            },
        )
        .await
        .map_err(DeltaError::delta("commit"))?
        .version;

    table.load().await.map_err(DeltaError::delta("load"))?;
    Ok(version)
}
