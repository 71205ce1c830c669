//! Typed row batches that remember which landing file each row came from.

use std::sync::Arc;

use deltalake::arrow::array::ArrayRef;
use deltalake::arrow::datatypes::{DataType as ArrowDataType, Field, Schema, SchemaRef};
use deltalake::arrow::record_batch::RecordBatch;

use bronze_model::{ColumnSpec, DataType, TableSchema};

use crate::error::{Result, TransformError};

/// A contiguous run of rows loaded from one landing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub uri: String,
    /// File name without directories.
    pub name: String,
    pub rows: usize,
}

/// An Arrow record batch plus the lineage of its rows.
///
/// Rows are ordered file by file, in the order of `sources`.
#[derive(Debug, Clone)]
pub struct TypedBatch {
    batch: RecordBatch,
    sources: Vec<SourceSpan>,
}

impl TypedBatch {
    pub fn new(batch: RecordBatch, sources: Vec<SourceSpan>) -> Self {
        Self { batch, sources }
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn sources(&self) -> &[SourceSpan] {
        &self.sources
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| TransformError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Appends columns, replacing any existing column of the same name in place.
    pub(crate) fn with_columns(self, additions: Vec<(Field, ArrayRef)>) -> Result<Self> {
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();

        for (field, array) in additions {
            match fields.iter().position(|f| f.name() == field.name()) {
                Some(idx) => {
                    fields[idx] = field;
                    columns[idx] = array;
                }
                None => {
                    fields.push(field);
                    columns.push(array);
                }
            }
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        Ok(Self {
            batch,
            sources: self.sources,
        })
    }
}

/// Arrow type used to store a manifest type.
pub fn arrow_type(data_type: DataType) -> ArrowDataType {
    match data_type {
        DataType::Long => ArrowDataType::Int64,
        DataType::Integer => ArrowDataType::Int32,
        DataType::Double => ArrowDataType::Float64,
        DataType::Decimal { precision, scale } => {
            // Scale never exceeds precision, which is at most 38.
            ArrowDataType::Decimal128(precision, i8::try_from(scale).unwrap_or(i8::MAX))
        }
        DataType::String => ArrowDataType::Utf8,
        DataType::Boolean => ArrowDataType::Boolean,
        DataType::Date => ArrowDataType::Date32,
    }
}

/// Arrow field of a source column. Always nullable, whatever the manifest says.
pub fn arrow_field(column: &ColumnSpec) -> Field {
    Field::new(&column.name, arrow_type(column.data_type), true)
}

/// Arrow schema of the source columns of a manifest.
pub fn arrow_schema(schema: &TableSchema) -> Schema {
    Schema::new(schema.columns().iter().map(arrow_field).collect::<Vec<_>>())
}
