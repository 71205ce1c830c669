//! Casting string-typed landing frames to the declared schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use deltalake::arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Decimal128Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use deltalake::arrow::record_batch::RecordBatch;
use tracing::{debug, info, warn};

use bronze_ingest::LandingBatch;
use bronze_model::{ColumnSpec, DataType, TableSchema};

use crate::batch::{SourceSpan, TypedBatch, arrow_schema};
use crate::error::Result;
use crate::parse::{
    parse_boolean, parse_date, parse_decimal, parse_double, parse_integer, parse_long,
};

/// What the cast had to tolerate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastReport {
    /// Non-empty values that failed to parse and became null, per column.
    pub nulled: BTreeMap<String, usize>,
    /// Declared columns absent from a file, as `(file name, column)`.
    pub missing: Vec<(String, String)>,
    /// File columns not in the schema, as `(file name, column)`.
    pub ignored: Vec<(String, String)>,
    /// Nulls found in columns the manifest declares non-nullable, per column.
    pub required_nulls: BTreeMap<String, usize>,
}

impl CastReport {
    pub fn nulled_total(&self) -> usize {
        self.nulled.values().sum()
    }
}

/// Casts every landing table to `schema` and stacks them into one batch.
///
/// Columns are matched by header name. Values that do not parse under their
/// declared type become null and are counted in the returned report. Every
/// column is read as nullable; nulls in a column declared non-nullable are
/// logged and counted, not rejected.
pub fn apply_schema(
    batch: &LandingBatch,
    schema: &TableSchema,
) -> Result<(TypedBatch, CastReport)> {
    let mut report = CastReport::default();
    let rows = batch.row_count();

    for table in batch.tables() {
        for spec in schema.columns() {
            if !table.headers.contains(&spec.name) {
                warn!(
                    file = %table.file.name,
                    column = %spec.name,
                    "declared column missing from file; values set to null"
                );
                report
                    .missing
                    .push((table.file.name.clone(), spec.name.clone()));
            }
        }
        for header in &table.headers.columns {
            if !schema.contains(header) {
                debug!(file = %table.file.name, column = %header, "ignoring undeclared column");
                report
                    .ignored
                    .push((table.file.name.clone(), header.clone()));
            }
        }
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.len());
    for spec in schema.columns() {
        let mut raw: Vec<Option<&str>> = Vec::with_capacity(rows);
        for table in batch.tables() {
            match table.column_values(&spec.name)? {
                Some(values) => raw.extend(values),
                None => raw.extend(std::iter::repeat_n(None, table.height())),
            }
        }

        let (array, failures) = cast_column(spec, &raw)?;
        if failures > 0 {
            warn!(
                column = %spec.name,
                data_type = %spec.data_type,
                count = failures,
                "values could not be parsed and were set to null"
            );
            report.nulled.insert(spec.name.clone(), failures);
        }
        if !spec.nullable && array.null_count() > 0 {
            warn!(
                column = %spec.name,
                count = array.null_count(),
                "column declared non-nullable holds nulls"
            );
            report
                .required_nulls
                .insert(spec.name.clone(), array.null_count());
        }
        columns.push(array);
    }

    let record_batch = RecordBatch::try_new(Arc::new(arrow_schema(schema)), columns)?;
    let sources = batch
        .tables()
        .iter()
        .map(|table| SourceSpan {
            uri: table.file.uri.clone(),
            name: table.file.name.clone(),
            rows: table.height(),
        })
        .collect();

    info!(
        rows = record_batch.num_rows(),
        columns = record_batch.num_columns(),
        nulled = report.nulled_total(),
        "schema applied"
    );
    Ok((TypedBatch::new(record_batch, sources), report))
}

/// Parses one column, returning the array and the number of failed parses.
fn cast_column(spec: &ColumnSpec, raw: &[Option<&str>]) -> Result<(ArrayRef, usize)> {
    let mut failures = 0;
    let array: ArrayRef = match spec.data_type {
        DataType::Long => Arc::new(Int64Array::from(parse_all(raw, parse_long, &mut failures))),
        DataType::Integer => {
            Arc::new(Int32Array::from(parse_all(raw, parse_integer, &mut failures)))
        }
        DataType::Double => {
            Arc::new(Float64Array::from(parse_all(raw, parse_double, &mut failures)))
        }
        DataType::Decimal { precision, scale } => {
            let values = parse_all(raw, |v| parse_decimal(v, precision, scale), &mut failures);
            let scale = i8::try_from(scale).unwrap_or(i8::MAX);
            Arc::new(Decimal128Array::from(values).with_precision_and_scale(precision, scale)?)
        }
        DataType::String => Arc::new(StringArray::from(raw.to_vec())),
        DataType::Boolean => {
            Arc::new(BooleanArray::from(parse_all(raw, parse_boolean, &mut failures)))
        }
        DataType::Date => Arc::new(Date32Array::from(parse_all(raw, parse_date, &mut failures))),
    };
    Ok((array, failures))
}

fn parse_all<T>(
    raw: &[Option<&str>],
    parse: impl Fn(&str) -> Option<T>,
    failures: &mut usize,
) -> Vec<Option<T>> {
    let mut values = Vec::with_capacity(raw.len());
    for value in raw {
        let parsed = value.and_then(&parse);
        if value.is_some() && parsed.is_none() {
            *failures += 1;
        }
        values.push(parsed);
    }
    values
}

#[cfg(test)]
mod tests {
    use bronze_ingest::{CsvOptions, LandingFile, LandingTable};
    use bytes::Bytes;

    use super::*;

    fn landing(content: &'static str) -> LandingBatch {
        let file = LandingFile {
            path: "a.csv".into(),
            uri: "file:///landing/a.csv".to_string(),
            name: "a.csv".to_string(),
            size: content.len() as u64,
        };
        let bytes = Bytes::from_static(content.as_bytes());
        let table = LandingTable::from_bytes(file, bytes, &CsvOptions::default()).unwrap();
        LandingBatch::new(vec![table])
    }

    #[test]
    fn test_parse_all_counts_failures_not_nulls() {
        let mut failures = 0;
        let values = parse_all(&[Some("1"), None, Some("x")], parse_long, &mut failures);
        assert_eq!(values, vec![Some(1), None, None]);
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_cast_decimal_column() {
        let spec = ColumnSpec::new("LATITUDE", DataType::decimal(15, 8).unwrap());
        let (array, failures) = cast_column(&spec, &[Some("-17.35"), Some("n/a")]).unwrap();
        let decimals = array.as_any().downcast_ref::<Decimal128Array>().unwrap();
        assert_eq!(decimals.value(0), -1_735_000_000);
        assert!(decimals.is_null(1));
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_cast_string_column_keeps_values() {
        let spec = ColumnSpec::new("IATA_CODE", DataType::String);
        let (array, failures) = cast_column(&spec, &[Some("AAA"), None]).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array.null_count(), 1);
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_nulls_in_non_nullable_column_are_reported() {
        let schema = TableSchema::new(vec![
            ColumnSpec {
                nullable: false,
                ..ColumnSpec::new("IATA_CODE", DataType::String)
            },
            ColumnSpec::new("API_ID", DataType::Long),
        ])
        .unwrap();

        let batch = landing("IATA_CODE;API_ID\nAAA;1\n;2\n");
        let (typed, report) = apply_schema(&batch, &schema).unwrap();
        assert_eq!(typed.num_rows(), 2);
        assert_eq!(report.required_nulls.get("IATA_CODE"), Some(&1));
        assert!(typed.record_batch().schema().field(0).is_nullable());
    }
}
