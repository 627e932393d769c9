//! CLI argument definitions for the rate catalog tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ratecat",
    version,
    about = "Rate catalog extractor - turn informal rate spreadsheets into a validated catalog",
    long_about = "Segment rate spreadsheets into tables, classify them, interpret their rates \
                  and validate the resulting service catalog.\n\n\
                  Inputs are CSV sheets (one file per sheet), JSON workbooks or xlsx workbooks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

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

    /// Directory of business-line TOML bundles (overrides RATECAT_CONFIG_DIR).
    #[arg(long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process one document made of one or more sheets.
    Process(ProcessArgs),

    /// List configured business lines.
    BusinessLines,
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// CSV files, JSON or xlsx workbooks, or directories containing them.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Business line whose configuration bundle drives processing.
    ///
    /// `auto` picks it from sheet and file names, falling back to accounts.
    #[arg(long = "business-line", short = 'b', default_value = "accounts")]
    pub business_line: String,

    /// Output directory for artifacts (default: ./output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Version label recorded in the catalog.
    #[arg(long = "document-version", default_value = "v1")]
    pub document_version: String,

    /// Skip the segmentation artifact.
    #[arg(long = "no-intermediate")]
    pub no_intermediate: bool,

    /// Validate and report without writing artifacts.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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
