//! CLI argument definitions for the landing-to-bronze loader.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use bronze_model::DeliveryMode;

#[derive(Parser)]
#[command(
    name = "landing-to-bronze",
    version,
    about = "Load landing zone CSV files into a bronze Delta table",
    long_about = "Load the CSV files delivered for one instance into its bronze Delta table.\n\n\
                  Rows are cast to the instance manifest, tagged with lineage columns and\n\
                  hashed (HASH_KEY, HASH_VALUE). The destination table is replaced on every run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings, -qq for errors).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the load: discover, cast, enrich, hash, truncate and write.
    Run(RunArgs),

    /// Print the bronze table layout of the instance.
    Schema,

    /// Print the first rows of the bronze table.
    Preview(PreviewArgs),
}

/// Settings layered over the config file.
#[derive(Args)]
pub struct ConfigArgs {
    /// TOML file overriding the built-in defaults.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Instance to load (landing folder and bronze table name).
    #[arg(long = "instance", value_name = "NAME", global = true)]
    pub instance: Option<String>,

    /// Delivery mode recorded in LOAD_TYPE.
    #[arg(long = "delivery-mode", value_enum, global = true)]
    pub delivery_mode: Option<DeliveryModeArg>,

    /// Landing folder URL, optionally ending in `*` (overrides the configured layout).
    #[arg(long = "landing", value_name = "URL", global = true)]
    pub landing: Option<String>,

    /// Resolve containers under this local directory instead of Azure.
    #[arg(long = "local-root", value_name = "DIR", global = true)]
    pub local_root: Option<PathBuf>,

    /// Instance manifest replacing the built-in one.
    #[arg(long = "manifest", value_name = "PATH", global = true)]
    pub manifest: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Stop after hashing; do not truncate or write the table.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Number of rows to print.
    #[arg(long = "limit", default_value_t = 100)]
    pub limit: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DeliveryModeArg {
    Full,
    Delta,
}

impl From<DeliveryModeArg> for DeliveryMode {
    fn from(value: DeliveryModeArg) -> Self {
        match value {
            DeliveryModeArg::Full => Self::Full,
            DeliveryModeArg::Delta => Self::Delta,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
