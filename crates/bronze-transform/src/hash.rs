//! Business-key and attribute hashes.

use std::borrow::Cow;
use std::sync::Arc;

use deltalake::arrow::array::{ArrayRef, StringArray};
use deltalake::arrow::datatypes::{DataType as ArrowDataType, Field};
use md5::{Digest, Md5};
use tracing::debug;

use bronze_model::{HASH_KEY, HASH_VALUE};

use crate::batch::TypedBatch;
use crate::canonical::CanonicalColumn;
use crate::error::{Result, TransformError};

/// Separator placed between hashed values.
pub const SEPARATOR: &str = "#";

/// Value every business key takes when all of them are null or blank.
pub const NULL_KEY_SENTINEL: &str = "-1";

/// Lowercase hex MD5 of a string.
///
/// ```
/// use bronze_transform::hash::md5_hex;
///
/// assert_eq!(md5_hex("-1"), "6bb61e3b7bce0931da574d19d1d82c88");
/// ```
pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// Joins values with `separator`, skipping nulls entirely.
///
/// Empty strings are kept, so `[Some("a"), Some(""), None, Some("b")]`
/// joins to `a##b`.
pub fn concat_ws<S: AsRef<str>>(separator: &str, values: &[Option<S>]) -> String {
    let mut joined = String::new();
    let mut first = true;
    for value in values.iter().flatten() {
        if !first {
            joined.push_str(separator);
        }
        joined.push_str(value.as_ref());
        first = false;
    }
    joined
}

/// Hash of one row's business keys, in key order.
///
/// When every key is null or made only of spaces each one contributes `-1`;
/// otherwise the values are used as they are, nulls included. Only U+0020
/// counts as blank here.
pub fn business_key_hash<S: AsRef<str>>(values: &[Option<S>]) -> String {
    let all_missing = values
        .iter()
        .all(|v| v.as_ref().is_none_or(|s| s.as_ref().trim_matches(' ').is_empty()));
    if all_missing {
        let sentinels = vec![Some(NULL_KEY_SENTINEL); values.len()];
        return md5_hex(&concat_ws(SEPARATOR, &sentinels));
    }
    md5_hex(&concat_ws(SEPARATOR, values))
}

/// Hash of one row's tracked attributes, in attribute order.
pub fn attribute_hash<S: AsRef<str>>(values: &[Option<S>]) -> String {
    md5_hex(&concat_ws(SEPARATOR, values))
}

/// Appends `HASH_KEY` and `HASH_VALUE` computed from the named columns.
pub fn add_hash_columns(
    batch: TypedBatch,
    business_keys: &[String],
    attributes: &[String],
) -> Result<TypedBatch> {
    if business_keys.is_empty() {
        return Err(TransformError::NoHashColumns("business key hash"));
    }
    if attributes.is_empty() {
        return Err(TransformError::NoHashColumns("attribute hash"));
    }

    let rows = batch.num_rows();
    let (hash_keys, hash_values) = {
        let keys = canonical_columns(&batch, business_keys)?;
        let attrs = canonical_columns(&batch, attributes)?;

        let mut hash_keys = Vec::with_capacity(rows);
        let mut hash_values = Vec::with_capacity(rows);
        for row in 0..rows {
            hash_keys.push(business_key_hash(&row_values(&keys, row)));
            hash_values.push(attribute_hash(&row_values(&attrs, row)));
        }
        (hash_keys, hash_values)
    };

    debug!(
        rows,
        business_keys = ?business_keys,
        attributes = attributes.len(),
        "computed hash columns"
    );

    let columns = vec![
        (
            Field::new(HASH_KEY, ArrowDataType::Utf8, false),
            Arc::new(StringArray::from(hash_keys)) as ArrayRef,
        ),
        (
            Field::new(HASH_VALUE, ArrowDataType::Utf8, false),
            Arc::new(StringArray::from(hash_values)) as ArrayRef,
        ),
    ];
    batch.with_columns(columns)
}

fn canonical_columns<'a>(
    batch: &'a TypedBatch,
    names: &[String],
) -> Result<Vec<CanonicalColumn<'a>>> {
    names
        .iter()
        .map(|name| CanonicalColumn::try_new(name, batch.column(name)?))
        .collect()
}

fn row_values<'a>(columns: &[CanonicalColumn<'a>], row: usize) -> Vec<Option<Cow<'a, str>>> {
    columns.iter().map(|column| column.value(row)).collect()
}
