//! Opening and creating Delta tables.

use std::collections::HashMap;
use std::sync::Once;

use deltalake::DeltaTable;
use deltalake::arrow::datatypes::Schema;
use deltalake::kernel::StructType;
use deltalake::operations::create::CreateBuilder;
use tracing::info;

use bronze_common::StorageLocation;

use crate::error::{DeltaError, Result};

/// Options applied when a bronze table is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Table name recorded in the Delta metadata.
    pub name: Option<String>,
    /// Table properties (`delta.*` configuration).
    pub configuration: HashMap<String, String>,
}

impl TableOptions {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }
}

/// Registers the Azure storage handlers with deltalake. Safe to call repeatedly.
pub fn ensure_handlers_registered() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| deltalake::azure::register_handlers(None));
}

/// Convert an Arrow schema to a Delta schema.
pub fn arrow_schema_to_delta(schema: &Schema) -> Result<StructType> {
    use deltalake::kernel::engine::arrow_conversion::TryIntoKernel;
    use deltalake::kernel::{DataType as DeltaType, StructField};

    let fields: Vec<StructField> = schema
        .fields()
        .iter()
        .map(|field| {
            let delta_type: DeltaType = field
                .data_type()
                .try_into_kernel()
                .map_err(|source| DeltaError::SchemaConversion { source })?;
            Ok(StructField::new(field.name(), delta_type, field.is_nullable()))
        })
        .collect::<Result<Vec<_>>>()?;

    StructType::try_new(fields).map_err(|e| DeltaError::StructType {
        message: e.to_string(),
    })
}

/// Current schema of a loaded table, as Arrow.
pub fn table_arrow_schema(table: &DeltaTable) -> Result<Schema> {
    use deltalake::kernel::engine::arrow_conversion::TryIntoArrow;

    let snapshot = table.snapshot().map_err(DeltaError::delta("snapshot"))?;
    snapshot
        .schema()
        .as_ref()
        .try_into_arrow()
        .map_err(|source| DeltaError::SchemaConversion { source })
}

/// Current schema of a loaded table, as Delta.
pub fn table_delta_schema(table: &DeltaTable) -> Result<StructType> {
    arrow_schema_to_delta(&table_arrow_schema(table)?)
}

/// Opens an existing table.
///
/// Use [`DeltaError::is_table_not_found`] to tell a missing table apart from
/// other failures.
pub async fn open_table(location: &StorageLocation) -> Result<DeltaTable> {
    ensure_handlers_registered();
    let table = deltalake::open_table_with_storage_options(
        location.url().clone(),
        location.options().clone(),
    )
    .await
    .map_err(DeltaError::delta("open"))?;
    info!(
        location = %location,
        version = table.version().unwrap_or(-1),
        "opened Delta table"
    );
    Ok(table)
}

/// Creates a table whose columns are the fields of `schema`.
pub async fn create_table(
    location: &StorageLocation,
    schema: &Schema,
    options: &TableOptions,
) -> Result<DeltaTable> {
    ensure_handlers_registered();
    let delta_schema = arrow_schema_to_delta(schema)?;

    let mut builder = CreateBuilder::new()
        .with_location(location.url().as_str())
        .with_columns(delta_schema.fields().cloned())
        .with_storage_options(location.options().clone());
    if let Some(name) = &options.name {
        builder = builder.with_table_name(name);
    }
    if !options.configuration.is_empty() {
        builder = builder.with_configuration(
            options
                .configuration
                .iter()
                .map(|(key, value)| (key.clone(), Some(value.clone()))),
        );
    }

    let table = builder.await.map_err(DeltaError::delta("create"))?;
    info!(
        location = %location,
        columns = schema.fields().len(),
        "created Delta table"
    );
    Ok(table)
}
