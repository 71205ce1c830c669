//! Lineage and load metadata columns.

use std::sync::Arc;

use deltalake::arrow::array::{ArrayRef, StringArray};
use deltalake::arrow::datatypes::{DataType as ArrowDataType, Field};
use tracing::debug;
use uuid::Uuid;

use bronze_model::{DeliveryMode, FILE_PATH, LOAD_TYPE, ORIGINAL_FILE_NAME, RECORD_ID, RSRC};

use crate::batch::TypedBatch;
use crate::error::Result;

/// Values shared by every row of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataValues {
    /// Landing location as configured, including its trailing `*`.
    pub file_path: String,
    /// Data-source tag written to `RSRC`.
    pub data_source: String,
    pub delivery_mode: DeliveryMode,
}

impl MetadataValues {
    pub fn new(file_path: impl Into<String>, data_source: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            data_source: data_source.into(),
            delivery_mode: DeliveryMode::default(),
        }
    }

    #[must_use]
    pub fn with_delivery_mode(mut self, delivery_mode: DeliveryMode) -> Self {
        self.delivery_mode = delivery_mode;
        self
    }
}

/// Appends `file_path`, `original_file_name`, `RSRC`, `RECORD_ID` and `LOAD_TYPE`.
///
/// Existing columns, row count and row order are unchanged. Every row gets
/// a fresh random `RECORD_ID`.
pub fn add_metadata_columns(batch: TypedBatch, values: &MetadataValues) -> Result<TypedBatch> {
    let rows = batch.num_rows();

    let file_names: Vec<&str> = batch
        .sources()
        .iter()
        .flat_map(|span| std::iter::repeat_n(span.name.as_str(), span.rows))
        .collect();
    let record_ids: Vec<String> = (0..rows).map(|_| Uuid::new_v4().to_string()).collect();

    let columns = vec![
        constant(FILE_PATH, &values.file_path, rows),
        (
            utf8_field(ORIGINAL_FILE_NAME),
            Arc::new(StringArray::from(file_names)) as ArrayRef,
        ),
        constant(RSRC, &values.data_source, rows),
        (
            utf8_field(RECORD_ID),
            Arc::new(StringArray::from(record_ids)) as ArrayRef,
        ),
        constant(LOAD_TYPE, values.delivery_mode.as_str(), rows),
    ];

    debug!(
        rows,
        file_path = %values.file_path,
        load_type = %values.delivery_mode,
        "adding metadata columns"
    );
    batch.with_columns(columns)
}

fn utf8_field(name: &str) -> Field {
    Field::new(name, ArrowDataType::Utf8, false)
}

fn constant(name: &str, value: &str, rows: usize) -> (Field, ArrayRef) {
    let array = StringArray::from_iter_values(std::iter::repeat_n(value, rows));
    (utf8_field(name), Arc::new(array))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use deltalake::arrow::array::{Array, Int64Array};
    use deltalake::arrow::datatypes::Schema;
    use deltalake::arrow::record_batch::RecordBatch;

    use super::*;
    use crate::batch::SourceSpan;

    fn two_file_batch() -> TypedBatch {
        let schema = Schema::new(vec![Field::new("API_ID", ArrowDataType::Int64, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef],
        )
        .unwrap();
        let span = |name: &str, rows| SourceSpan {
            uri: format!("file:///landing/AIRPORTS/{name}"),
            name: name.to_string(),
            rows,
        };
        TypedBatch::new(batch, vec![span("a.csv", 2), span("b.csv", 1)])
    }

    fn strings(batch: &TypedBatch, column: &str) -> Vec<String> {
        let array = batch.column(column).unwrap();
        let values = array.as_any().downcast_ref::<StringArray>().unwrap();
        values.iter().map(|v| v.unwrap().to_string()).collect()
    }

    #[test]
    fn test_metadata_columns_values() {
        let values = MetadataValues::new("file:///landing/AIRPORTS/*", "CSV")
            .with_delivery_mode(DeliveryMode::Delta);
        let batch = add_metadata_columns(two_file_batch(), &values).unwrap();

        assert_eq!(
            batch.column_names(),
            vec![
                "API_ID",
                FILE_PATH,
                ORIGINAL_FILE_NAME,
                RSRC,
                RECORD_ID,
                LOAD_TYPE
            ]
        );
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(
            strings(&batch, ORIGINAL_FILE_NAME),
            vec!["a.csv", "a.csv", "b.csv"]
        );
        assert!(
            strings(&batch, FILE_PATH)
                .iter()
                .all(|p| p == "file:///landing/AIRPORTS/*")
        );
        assert!(strings(&batch, RSRC).iter().all(|v| v == "CSV"));
        assert!(strings(&batch, LOAD_TYPE).iter().all(|v| v == "DELTA"));
        assert_eq!(batch.column(RECORD_ID).unwrap().null_count(), 0);
    }

    #[test]
    fn test_record_ids_are_unique_uuids() {
        let values = MetadataValues::new("x/*", "CSV");
        let batch = add_metadata_columns(two_file_batch(), &values).unwrap();
        let ids = strings(&batch, RECORD_ID);

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        for id in &ids {
            let parsed = Uuid::parse_str(id).unwrap();
            assert_eq!(parsed.get_version_num(), 4);
            assert_eq!(id.len(), 36);
        }
    }
}
