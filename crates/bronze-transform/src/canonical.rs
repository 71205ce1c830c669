//! Canonical string rendering of typed cells.
//!
//! Hashes are computed over these strings, so the rendering of every type is
//! fixed: integers in base 10, decimals in plain notation with exactly their
//! declared scale, doubles the way the JVM prints them, booleans as
//! `true`/`false` and dates as `yyyy-MM-dd`.

use std::borrow::Cow;

use chrono::TimeDelta;
use deltalake::arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Decimal128Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use deltalake::arrow::datatypes::DataType as ArrowDataType;

use crate::error::{Result, TransformError};
use crate::parse::unix_epoch;

/// A typed column viewed through its canonical string form.
pub enum CanonicalColumn<'a> {
    Long(&'a Int64Array),
    Integer(&'a Int32Array),
    Double(&'a Float64Array),
    Decimal(&'a Decimal128Array, i8),
    Utf8(&'a StringArray),
    Boolean(&'a BooleanArray),
    Date(&'a Date32Array),
}

impl<'a> CanonicalColumn<'a> {
    pub fn try_new(name: &str, array: &'a ArrayRef) -> Result<Self> {
        let any = array.as_any();
        let column = match array.data_type() {
            ArrowDataType::Int64 => any.downcast_ref().map(Self::Long),
            ArrowDataType::Int32 => any.downcast_ref().map(Self::Integer),
            ArrowDataType::Float64 => any.downcast_ref().map(Self::Double),
            ArrowDataType::Decimal128(_, scale) => any
                .downcast_ref()
                .map(|values| Self::Decimal(values, *scale)),
            ArrowDataType::Utf8 => any.downcast_ref().map(Self::Utf8),
            ArrowDataType::Boolean => any.downcast_ref().map(Self::Boolean),
            ArrowDataType::Date32 => any.downcast_ref().map(Self::Date),
            _ => None,
        };
        column.ok_or_else(|| TransformError::UnsupportedType {
            column: name.to_string(),
            data_type: array.data_type().to_string(),
        })
    }

    /// Canonical string of the cell at `row`; `None` for null cells.
    pub fn value(&self, row: usize) -> Option<Cow<'a, str>> {
        match self {
            Self::Long(values) => {
                (!values.is_null(row)).then(|| Cow::Owned(values.value(row).to_string()))
            }
            Self::Integer(values) => {
                (!values.is_null(row)).then(|| Cow::Owned(values.value(row).to_string()))
            }
            Self::Double(values) => {
                (!values.is_null(row)).then(|| Cow::Owned(format_double(values.value(row))))
            }
            Self::Decimal(values, scale) => (!values.is_null(row))
                .then(|| Cow::Owned(format_decimal(values.value(row), *scale))),
            Self::Utf8(values) => (!values.is_null(row)).then(|| Cow::Borrowed(values.value(row))),
            Self::Boolean(values) => {
                (!values.is_null(row)).then(|| Cow::Borrowed(bool_str(values.value(row))))
            }
            Self::Date(values) => {
                if values.is_null(row) {
                    return None;
                }
                format_date(values.value(row)).map(Cow::Owned)
            }
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Renders an unscaled decimal in plain notation with exactly `scale` fraction digits.
///
/// ```
/// use bronze_transform::canonical::format_decimal;
///
/// assert_eq!(format_decimal(150_000_000, 8), "1.50000000");
/// assert_eq!(format_decimal(-5, 2), "-0.05");
/// assert_eq!(format_decimal(42, 0), "42");
/// ```
pub fn format_decimal(unscaled: i128, scale: i8) -> String {
    let digits = unscaled.unsigned_abs().to_string();
    let sign = if unscaled < 0 { "-" } else { "" };

    let Ok(scale) = usize::try_from(scale) else {
        // Negative scale: append zeros.
        let zeros = usize::from(scale.unsigned_abs());
        if unscaled == 0 {
            return "0".to_string();
        }
        return format!("{sign}{digits}{}", "0".repeat(zeros));
    };
    if scale == 0 {
        return format!("{sign}{digits}");
    }

    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    format!("{sign}{int_part}.{frac_part}")
}

/// Renders a double the way the JVM's `Double.toString` does.
///
/// Magnitudes in `[1e-3, 1e7)` use plain notation with at least one fraction
/// digit; everything else uses computerized scientific notation (`1.0E7`).
///
/// ```
/// use bronze_transform::canonical::format_double;
///
/// assert_eq!(format_double(1.0), "1.0");
/// assert_eq!(format_double(1.0e7), "1.0E7");
/// assert_eq!(format_double(0.0001), "1.0E-4");
/// assert_eq!(format_double(f64::NAN), "NaN");
/// ```
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // Shortest round-trip digits, e.g. "1.2345e7".
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if value < 0.0 { "-" } else { "" };

    let abs = value.abs();
    if (1e-3..1e7).contains(&abs) {
        let point = exponent + 1;
        let rendered = if point <= 0 {
            let zeros = usize::try_from(-point).unwrap_or(0);
            format!("0.{}{digits}", "0".repeat(zeros))
        } else {
            let point = usize::try_from(point).unwrap_or(0);
            if digits.len() <= point {
                format!("{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{}.{}", &digits[..point], &digits[point..])
            }
        };
        return format!("{sign}{rendered}");
    }

    let (first, rest) = digits.split_at(1);
    let rest = if rest.is_empty() { "0" } else { rest };
    format!("{sign}{first}.{rest}E{exponent}")
}

/// Renders days since the Unix epoch as `yyyy-MM-dd`.
pub fn format_date(days: i32) -> Option<String> {
    let delta = TimeDelta::try_days(i64::from(days))?;
    let date = unix_epoch().checked_add_signed(delta)?;
    Some(date.format("%Y-%m-%d").to_string())
}
