use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tracing::info;

use bronze_cli::{PipelineConfig, RunSummary, run_pipeline};
use bronze_delta::read_table;

use crate::cli::ConfigArgs;
use crate::summary::{print_preview, print_schema};

/// Config file (or defaults) with the command line flags applied on top.
pub fn resolve_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(instance) = &args.instance {
        config.instance.clone_from(instance);
    }
    if let Some(mode) = args.delivery_mode {
        config.delivery_mode = mode.into();
    }
    if let Some(landing) = &args.landing {
        config.landing_path = Some(landing.clone());
    }
    if let Some(root) = &args.local_root {
        config.local_root = Some(root.clone());
    }
    if let Some(manifest) = &args.manifest {
        config.manifest = Some(manifest.clone());
    }
    Ok(config)
}

pub fn run_load(config: &PipelineConfig, dry_run: bool) -> Result<RunSummary> {
    runtime()?.block_on(run_pipeline(config, dry_run))
}

pub fn run_schema(config: &PipelineConfig) -> Result<()> {
    let definition = config.instance_definition()?;
    print_schema(&definition);
    Ok(())
}

pub fn run_preview(config: &PipelineConfig, limit: usize) -> Result<()> {
    let bronze = config.bronze_location()?;
    info!(location = %bronze, limit, "reading bronze table");
    let contents = runtime()?
        .block_on(read_table(&bronze, Some(limit)))
        .with_context(|| format!("read bronze table {bronze}"))?;
    print_preview(&contents).context("render preview")?;
    Ok(())
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")
}
