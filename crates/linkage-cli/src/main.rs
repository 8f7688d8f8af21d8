//! Contact linkage CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use linkage_cli::logging::{LogConfig, LogFormat, init_logging};
use linkage_core::PipelineError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_config, run_match, run_plan};
use crate::summary::{print_plan, print_run_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run_match(&args) {
            Ok(result) => {
                print_run_summary(&result.report, result.output.as_deref());
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Plan(args) => match run_plan(&args) {
            Ok(plan) => {
                print_plan(&plan);
                if plan.exceeds_ceiling() { 1 } else { 0 }
            }
            Err(error) => report_error(&error),
        },
        Command::Config(args) => match run_config(&args) {
            Ok(text) => {
                print!("{text}");
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    if let Some(hint) = error
        .downcast_ref::<PipelineError>()
        .and_then(PipelineError::suggestion)
    {
        eprintln!("hint: {hint}");
    }
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
