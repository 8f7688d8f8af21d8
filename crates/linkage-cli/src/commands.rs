use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use linkage_cli::logging::redact_value;
use linkage_cli::output::{MATCH_SEPARATOR, OutputFormat, default_output_path, write_groups};
use linkage_core::{RunPlan, RunReport, plan, run};
use linkage_ingest::{load_matching_config, read_contacts_csv};
use linkage_model::{MatchingConfig, RecordKey, RecordSet, SingletonPolicy};

use crate::cli::{ConfigArgs, InputArgs, OutputFormatArg, PlanArgs, RunArgs};

pub struct RunResult {
    pub report: RunReport,
    /// `None` on a dry run.
    pub output: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<MatchingConfig> {
    match path {
        Some(path) => load_matching_config(path).context("load matching configuration"),
        None => {
            debug!("using built-in contact matching configuration");
            Ok(MatchingConfig::contacts_default())
        }
    }
}

fn load_input(input: &InputArgs) -> Result<(RecordSet, MatchingConfig)> {
    let config = load_config(input.config.as_deref())?;
    let ingest_start = Instant::now();
    let records = info_span!("ingest", path = %input.records.display())
        .in_scope(|| read_contacts_csv(&input.records, &input.key_column))
        .context("load contact records")?;
    info!(
        records = records.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok((records, config))
}

pub fn run_match(args: &RunArgs) -> Result<RunResult> {
    let (records, mut config) = load_input(&args.input)?;
    if args.exclude_singletons {
        config = config.with_singletons(SingletonPolicy::Exclude);
    }

    let outcome = run(&records, &config)?;
    for (idx, group) in outcome.groups.iter().enumerate() {
        if group.is_singleton() {
            continue;
        }
        let members: Vec<&str> = group.members().iter().map(RecordKey::as_str).collect();
        debug!(
            group_id = idx + 1,
            size = group.len(),
            members = redact_value(&members.join(MATCH_SEPARATOR)),
            "resolved group"
        );
    }

    let format = match args.format {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
    };
    let output = if args.dry_run {
        None
    } else {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&args.input.records, format));
        let output_start = Instant::now();
        info_span!("output", path = %path.display())
            .in_scope(|| write_groups(&path, &outcome.groups, format))?;
        info!(
            groups = outcome.groups.len(),
            duration_ms = output_start.elapsed().as_millis(),
            "output written"
        );
        Some(path)
    };
    Ok(RunResult {
        report: outcome.report,
        output,
    })
}

pub fn run_plan(args: &PlanArgs) -> Result<RunPlan> {
    let (records, config) = load_input(&args.input)?;
    Ok(plan(&records, &config)?)
}

/// Renders the effective configuration as TOML.
pub fn run_config(args: &ConfigArgs) -> Result<String> {
    let config = load_config(args.config.as_deref())?;
    config
        .validate()
        .context("validate built-in configuration")?;
    toml::to_string_pretty(&config).context("render configuration")
}
