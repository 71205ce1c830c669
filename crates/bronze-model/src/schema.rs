//! Explicit source schema applied to landing files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::columns::METADATA_COLUMNS;
use crate::error::{ModelError, Result};
use crate::types::DataType;

/// One declared source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Documented maximum length for string columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            length: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }
}

/// Ordered, name-unique list of source columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnSpec>", into = "Vec<ColumnSpec>")]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Builds a schema, rejecting duplicate names and metadata-column collisions.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if METADATA_COLUMNS.contains(&column.name.as_str()) {
                return Err(ModelError::ReservedColumn {
                    column: column.name.clone(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl TryFrom<Vec<ColumnSpec>> for TableSchema {
    type Error = ModelError;

    fn try_from(value: Vec<ColumnSpec>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TableSchema> for Vec<ColumnSpec> {
    fn from(value: TableSchema) -> Self {
        value.columns
    }
}
