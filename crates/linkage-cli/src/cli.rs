//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use linkage_ingest::DEFAULT_KEY_COLUMN;

#[derive(Parser)]
#[command(
    name = "contact-linkage",
    version,
    about = "Resolve enriched contact records into groups of the same person",
    long_about = "Resolve enriched contact records into groups of the same person.\n\n\
                  Candidate pairs come from blocking strategies, are scored field by field \
                  and matched against per-strategy thresholds; matches from every strategy \
                  are merged into disjoint groups."
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

    /// Log output format (pretty for humans, json for machine parsing).
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

    /// Allow record keys to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match a contact file and write the resolved groups.
    Run(RunArgs),

    /// Report candidate-pair counts per strategy without matching.
    Plan(PlanArgs),

    /// Validate and print the effective matching configuration.
    Config(ConfigArgs),
}

/// Inputs shared by commands that read a contact file.
#[derive(Args)]
pub struct InputArgs {
    /// Enriched contact CSV with a header row.
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Matching configuration (TOML). Defaults to the built-in contact setup.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Column holding the unique record key.
    #[arg(long = "key-column", value_name = "NAME", default_value = DEFAULT_KEY_COLUMN)]
    pub key_column: String,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output path (default: <RECORDS stem>.groups.<format> next to RECORDS).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormatArg,

    /// Report only groups with two or more records.
    #[arg(long = "exclude-singletons")]
    pub exclude_singletons: bool,

    /// Match and summarize without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration to validate (default: the built-in contact setup).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
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
