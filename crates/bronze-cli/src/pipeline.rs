//! The landing-to-bronze load: discover, load, cast, enrich, hash, truncate, write.

use anyhow::{Context, Result};
use deltalake::arrow::record_batch::RecordBatch;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span};

use bronze_common::{Storage, StorageLocation};
use bronze_delta::{truncate_table, write_batch};
use bronze_ingest::{discover_csv_files, load_landing_files};
use bronze_model::DeliveryMode;
use bronze_transform::{MetadataValues, add_hash_columns, add_metadata_columns, apply_schema};

use crate::config::PipelineConfig;

/// Name the load reports itself under in logs.
pub const PIPELINE_NAME: &str = "LANDING_2_BRONZE";

/// Failures owned by the orchestration itself rather than a stage crate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The landing folder holds no CSV files; nothing was truncated or written.
    #[error("no CSV files found in {location}")]
    NoCsvFiles { location: String },
}

/// What one run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub instance: String,
    pub delivery_mode: DeliveryMode,
    pub landing: String,
    pub bronze: String,
    pub files: usize,
    pub rows: usize,
    /// Non-empty values that failed to parse under their declared type.
    pub nulled_values: usize,
    /// Objects removed from the destination before writing.
    pub deleted_objects: usize,
    /// Committed table version; `None` for dry runs.
    pub version: Option<i64>,
    /// Columns merged into an existing table schema.
    pub added_columns: Vec<String>,
    pub dry_run: bool,
}

/// Runs the load for the configured instance.
///
/// Stops after hashing when `dry_run` is set. A failure in any stage aborts
/// the rest, is logged with the instance name and is returned as is; the
/// completion line is logged either way.
pub async fn run_pipeline(config: &PipelineConfig, dry_run: bool) -> Result<RunSummary> {
    let instance = config.instance_name();
    let span = info_span!(
        "pipeline",
        pattern = %config.pattern_name,
        layer = %config.layer_name,
        instance = %instance,
    );

    let result = execute(config, &instance, dry_run)
        .instrument(span.clone())
        .await;

    let _guard = span.enter();
    match &result {
        Ok(summary) => info!(
            files = summary.files,
            rows = summary.rows,
            version = ?summary.version,
            dry_run,
            "bronze load finished"
        ),
        Err(err) => error!(instance = %instance, error = %format!("{err:#}"), "bronze load failed"),
    }
    info!("{PIPELINE_NAME} pipeline completed");
    result
}

async fn execute(config: &PipelineConfig, instance: &str, dry_run: bool) -> Result<RunSummary> {
    let definition = config.instance_definition()?;
    let landing = config.landing_location()?;
    let bronze = config.bronze_location()?;
    info!(
        landing = %landing,
        bronze = %bronze,
        delivery_mode = %config.delivery_mode,
        "starting {PIPELINE_NAME} pipeline"
    );

    let storage = Storage::open(&landing).context("open landing zone")?;
    let files = discover_csv_files(&storage)
        .instrument(info_span!("discover"))
        .await
        .context("discover landing files")?
        .ok_or_else(|| PipelineError::NoCsvFiles {
            location: landing.to_string(),
        })?;
    info!(count = files.count(), "landing files discovered");

    let landing_batch = load_landing_files(&storage, &files, &config.csv_options()?)
        .instrument(info_span!("load"))
        .await
        .context("load landing files")?;

    let (typed, report) = info_span!("cast")
        .in_scope(|| apply_schema(&landing_batch, &definition.columns))
        .context("apply schema")?;
    drop(landing_batch);

    let hashed = info_span!("enrich").in_scope(|| {
        let values = MetadataValues::new(landing.glob(), &config.data_source)
            .with_delivery_mode(config.delivery_mode);
        let enriched = add_metadata_columns(typed, &values).context("add metadata columns")?;
        add_hash_columns(enriched, &definition.business_keys, &definition.attributes)
            .context("compute hash columns")
    })?;

    let mut summary = RunSummary {
        instance: instance.to_string(),
        delivery_mode: config.delivery_mode,
        landing: landing.glob(),
        bronze: bronze.to_string(),
        files: files.count(),
        rows: hashed.num_rows(),
        nulled_values: report.nulled_total(),
        deleted_objects: 0,
        version: None,
        added_columns: Vec::new(),
        dry_run,
    };
    if dry_run {
        info!(rows = summary.rows, "dry run; destination left untouched");
        return Ok(summary);
    }

    write_bronze(config, &definition.name, &bronze, hashed.record_batch(), &mut summary)
        .instrument(info_span!("write"))
        .await?;
    Ok(summary)
}

async fn write_bronze(
    config: &PipelineConfig,
    table_name: &str,
    bronze: &StorageLocation,
    batch: &RecordBatch,
    summary: &mut RunSummary,
) -> Result<()> {
    let truncated = truncate_table(bronze)
        .await
        .context("truncate bronze table")?;
    summary.deleted_objects = truncated.deleted();

    let outcome = write_batch(bronze, batch, &config.table_options(table_name))
        .await
        .context("write bronze table")?;
    summary.version = Some(outcome.version);
    summary.added_columns = outcome.added_columns;
    Ok(())
}
