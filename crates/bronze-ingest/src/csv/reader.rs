//! Delimiter-aware CSV loading into string-typed DataFrames.

use std::io::Cursor;

use bytes::Bytes;
use polars::prelude::{CsvParseOptions, CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, info, warn};

use bronze_common::Storage;

use crate::discovery::{LandingFile, LandingFiles};
use crate::error::{IngestError, Result};

use super::header::{CsvHeaders, normalize_header};

/// Parse options for landing files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: Option<u8>,
    /// Trim leading and trailing ASCII whitespace and control characters
    /// (anything up to U+0020) from every value.
    pub trim_whitespace: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            quote: Some(b'"'),
            trim_whitespace: true,
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// One landing file parsed into a DataFrame whose columns are all strings.
#[derive(Debug, Clone)]
pub struct LandingTable {
    pub file: LandingFile,
    pub headers: CsvHeaders,
    frame: DataFrame,
    trim_whitespace: bool,
}

impl LandingTable {
    /// Parses the raw bytes of `file`.
    pub fn from_bytes(file: LandingFile, bytes: Bytes, options: &CsvOptions) -> Result<Self> {
        validate_encoding(&bytes, &file.uri)?;

        let headers = CsvHeaders::from_bytes(&bytes, options.delimiter).ok_or_else(|| {
            IngestError::NoHeaderDetected {
                path: file.uri.clone(),
            }
        })?;
        let frame = parse_csv_bytes(bytes, options, &file.uri)?;
        debug!(
            path = %file.uri,
            columns = headers.len(),
            rows = frame.height(),
            "parsed landing file"
        );

        Ok(Self {
            file,
            headers,
            frame,
            trim_whitespace: options.trim_whitespace,
        })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Returns the values of a column looked up by normalized header name.
    ///
    /// Values are trimmed when the load trimmed whitespace, and empty values are
    /// `None`. Returns `Ok(None)` when the file has no such column.
    pub fn column_values(&self, name: &str) -> Result<Option<Vec<Option<&str>>>> {
        let Some(column) = self
            .frame
            .get_columns()
            .iter()
            .find(|c| normalize_header(c.name().as_str()) == name)
        else {
            return Ok(None);
        };

        let strings = column
            .as_materialized_series()
            .str()
            .map_err(|_| IngestError::ColumnType {
                column: name.to_string(),
                path: self.file.uri.clone(),
            })?;

        let trim = self.trim_whitespace;
        let values = strings
            .into_iter()
            .map(|value| {
                value
                    .map(|v| if trim { trim_value(v) } else { v })
                    .filter(|v| !v.is_empty())
            })
            .collect();
        Ok(Some(values))
    }
}

/// All landing files of one run, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct LandingBatch {
    tables: Vec<LandingTable>,
}

impl LandingBatch {
    pub fn new(tables: Vec<LandingTable>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[LandingTable] {
        &self.tables
    }

    pub fn file_count(&self) -> usize {
        self.tables.len()
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(LandingTable::height).sum()
    }
}

/// Reads every discovered file from the landing store.
pub async fn load_landing_files(
    storage: &Storage,
    files: &LandingFiles,
    options: &CsvOptions,
) -> Result<LandingBatch> {
    let mut tables = Vec::with_capacity(files.count());

    for file in files {
        let bytes = storage.get(&file.path).await?;
        if is_blank(&bytes) {
            warn!(path = %file.uri, "landing file is empty; it adds no rows");
            continue;
        }
        tables.push(LandingTable::from_bytes(file.clone(), bytes, options)?);
    }

    let batch = LandingBatch::new(tables);
    info!(
        files = batch.file_count(),
        rows = batch.row_count(),
        "landing files loaded"
    );
    Ok(batch)
}

/// Parses delimited bytes with a header row; every column is read as a string.
pub fn parse_csv_bytes(bytes: Bytes, options: &CsvOptions, origin: &str) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_separator(options.delimiter)
        .with_quote_char(options.quote)
        .with_truncate_ragged_lines(true);

    CsvReadOptions::default()
        .with_has_header(true)
        // Zero inference rows reads every column as String.
        .with_infer_schema_length(Some(0))
        .with_raise_if_empty(false)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
}

/// Strips leading and trailing characters up to and including U+0020.
///
/// Unicode spaces such as U+00A0 are kept.
fn trim_value(value: &str) -> &str {
    value.trim_matches(|c: char| c <= ' ')
}

/// True for files holding nothing but a byte order mark and whitespace.
fn is_blank(bytes: &[u8]) -> bool {
    let content = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    content.trim_ascii().is_empty()
}

/// Rejects UTF-16 input, which the CSV parser would silently mangle.
fn validate_encoding(bytes: &[u8], path: &str) -> Result<()> {
    let encoding = match bytes.get(0..2) {
        Some([0xFF, 0xFE]) => "UTF-16 LE",
        Some([0xFE, 0xFF]) => "UTF-16 BE",
        _ => return Ok(()),
    };
    Err(IngestError::UnsupportedEncoding {
        path: path.to_string(),
        encoding,
    })
}
