//! Schema merge and by-name batch alignment.

use std::collections::HashMap;
use std::sync::Arc;

use deltalake::DeltaTable;
use deltalake::arrow::array::{ArrayRef, new_null_array};
use deltalake::arrow::compute::cast;
use deltalake::arrow::datatypes::Schema;
use deltalake::arrow::record_batch::RecordBatch;
use deltalake::kernel::transaction::CommitBuilder;
use deltalake::kernel::{Action, StructField, StructType};
use deltalake::protocol::DeltaOperation;
use tracing::info;

use crate::error::{DeltaError, Result};

/// Result of merging a batch schema into a table schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMerge {
    /// Columns the table does not have yet, in batch order.
    pub added: Vec<String>,
    /// Table schema with the added columns appended; `None` when nothing changes.
    pub merged: Option<StructType>,
}

/// Merges `incoming` into `table`.
///
/// New columns are appended as nullable fields. A column present in both
/// with a different type is a [`DeltaError::TypeConflict`].
pub fn merge_schema(table: &StructType, incoming: &StructType) -> Result<SchemaMerge> {
    let mut added = Vec::new();
    let mut new_fields = Vec::new();

    for field in incoming.fields() {
        match table.field(field.name()) {
            Some(existing) if existing.data_type() != field.data_type() => {
                return Err(DeltaError::TypeConflict {
                    column: field.name().clone(),
                    table_type: format!("{:?}", existing.data_type()),
                    batch_type: format!("{:?}", field.data_type()),
                });
            }
            Some(_) => {}
            None => {
                added.push(field.name().clone());
                new_fields.push(StructField::new(
                    field.name(),
                    field.data_type().clone(),
                    true,
                ));
            }
        }
    }

    if new_fields.is_empty() {
        return Ok(SchemaMerge {
            added,
            merged: None,
        });
    }

    let fields: Vec<StructField> = table.fields().cloned().chain(new_fields).collect();
    let merged = StructType::try_new(fields).map_err(|e| DeltaError::StructType {
        message: e.to_string(),
    })?;
    Ok(SchemaMerge {
        added,
        merged: Some(merged),
    })
}

/// Commits a new table schema as a metadata-only change.
pub async fn commit_schema(table: &mut DeltaTable, schema: &StructType) -> Result<i64> {
    use deltalake::kernel::MetadataExt;

    let snapshot = table.snapshot().map_err(DeltaError::delta("snapshot"))?;
    let metadata = snapshot
        .metadata()
        .clone()
        .with_schema(schema)
        .map_err(|source| DeltaError::Delta {
            operation: "schema update",
            source: deltalake::DeltaTableError::Kernel { source },
        })?;

    let version = CommitBuilder::default()
        .with_actions(vec![Action::Metadata(metadata)])
        .build(
            Some(snapshot),
            table.log_store(),
            DeltaOperation::SetTableProperties {
                properties: HashMap::new(),
            },
        )
        .await
        .map_err(DeltaError::delta("schema commit"))?
        .version;

    table.load().await.map_err(DeltaError::delta("load"))?;
    info!(version, columns = schema.fields().len(), "table schema merged");
    Ok(version)
}

/// Reorders and fills batch columns to match `target` by name.
///
/// Columns missing from the batch become all-null; a missing non-nullable
/// column is an error. Columns whose Arrow type differs are cast.
pub fn align_batch(batch: &RecordBatch, target: &Schema) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(target.fields().len());

    for field in target.fields() {
        let column = match batch.column_by_name(field.name()) {
            Some(array) if array.data_type() == field.data_type() => Arc::clone(array),
            Some(array) => cast(array, field.data_type())?,
            None if field.is_nullable() => new_null_array(field.data_type(), rows),
            None => {
                return Err(DeltaError::MissingRequiredColumn {
                    column: field.name().clone(),
                });
            }
        };
        columns.push(column);
    }

    Ok(RecordBatch::try_new(Arc::new(target.clone()), columns)?)
}

#[cfg(test)]
mod tests {
    use deltalake::arrow::array::{Array, Int64Array, StringArray};
    use deltalake::arrow::datatypes::{DataType as ArrowDataType, Field};
    use deltalake::kernel::DataType as DeltaType;

    use super::*;

    fn struct_type(fields: Vec<(&str, DeltaType)>) -> StructType {
        StructType::try_new(
            fields
                .into_iter()
                .map(|(name, data_type)| StructField::new(name, data_type, true)),
        )
        .unwrap()
    }

    #[test]
    fn test_merge_identical_is_noop() {
        let table = struct_type(vec![("A", DeltaType::LONG)]);
        let merge = merge_schema(&table, &table).unwrap();
        assert!(merge.added.is_empty());
        assert!(merge.merged.is_none());
    }

    #[test]
    fn test_merge_appends_new_nullable_columns() {
        let table = struct_type(vec![("A", DeltaType::LONG)]);
        let incoming = StructType::try_new(vec![
            StructField::new("B", DeltaType::STRING, false),
            StructField::new("A", DeltaType::LONG, true),
        ])
        .unwrap();

        let merge = merge_schema(&table, &incoming).unwrap();
        assert_eq!(merge.added, vec!["B"]);
        let merged = merge.merged.unwrap();
        let names: Vec<&String> = merged.fields().map(StructField::name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(merged.field("B").unwrap().is_nullable());
    }

    #[test]
    fn test_merge_rejects_type_change() {
        let table = struct_type(vec![("A", DeltaType::LONG)]);
        let incoming = struct_type(vec![("A", DeltaType::STRING)]);
        assert!(matches!(
            merge_schema(&table, &incoming),
            Err(DeltaError::TypeConflict { .. })
        ));
    }

    #[test]
    fn test_align_batch_by_name() {
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new(vec![
                Field::new("B", ArrowDataType::Utf8, true),
                Field::new("A", ArrowDataType::Int64, true),
            ])),
            vec![
                Arc::new(StringArray::from(vec!["x", "y"])) as ArrayRef,
                Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
            ],
        )
        .unwrap();
        let target = Schema::new(vec![
            Field::new("A", ArrowDataType::Int64, true),
            Field::new("B", ArrowDataType::Utf8, true),
            Field::new("C", ArrowDataType::Utf8, true),
        ]);

        let aligned = align_batch(&batch, &target).unwrap();
        assert_eq!(aligned.schema().as_ref(), &target);
        let a = aligned
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(a.value(1), 2);
        assert_eq!(aligned.column(2).null_count(), 2);
    }

    #[test]
    fn test_align_batch_missing_required_column() {
        let batch = RecordBatch::new_empty(Arc::new(Schema::empty()));
        let target = Schema::new(vec![Field::new("HASH_KEY", ArrowDataType::Utf8, false)]);
        assert!(matches!(
            align_batch(&batch, &target),
            Err(DeltaError::MissingRequiredColumn { .. })
        ));
    }
}
