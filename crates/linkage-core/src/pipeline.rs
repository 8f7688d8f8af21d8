//! End-to-end linkage run.
//!
//! `plan` sizes every strategy without generating pairs. `run` validates the
//! configuration, refuses to start when a strategy exceeds the candidate
//! ceiling, then blocks each strategy and scores its candidates in one
//! streaming pass that keeps only the matches. All match sets are merged into
//! one edge set, which is clustered once.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};

use linkage_cluster::{ClusterBuilder, ClusterStats};
use linkage_match::{
    Comparator, MatchClassifier, MatchError, ScoreHistogram, block_records, count_candidates,
};
use linkage_model::{
    BlockingSpec, CandidatePair, Group, MatchingConfig, RecordSet, SingletonPolicy,
};

use crate::error::Result;

/// Candidate volume of one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPlan {
    pub name: String,
    pub blocking: BlockingSpec,
    pub threshold: u32,
    pub candidate_pairs: u64,
    pub exceeds_ceiling: bool,
}

/// Candidate volume of a whole run, computed before any pair exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub records: usize,
    pub ceiling: u64,
    pub strategies: Vec<StrategyPlan>,
}

impl RunPlan {
    pub fn exceeds_ceiling(&self) -> bool {
        self.strategies.iter().any(|s| s.exceeds_ceiling)
    }

    pub fn total_candidates(&self) -> u64 {
        self.strategies
            .iter()
            .map(|s| s.candidate_pairs)
            .fold(0, u64::saturating_add)
    }

    /// First strategy over the ceiling, in configuration order.
    pub fn first_excess(&self) -> Option<&StrategyPlan> {
        self.strategies.iter().find(|s| s.exceeds_ceiling)
    }
}

/// What one strategy contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyReport {
    pub name: String,
    pub threshold: u32,
    pub candidate_pairs: usize,
    pub matches: usize,
    pub histogram: ScoreHistogram,
    pub block_time: Duration,
    /// Comparison and classification, which run as one pass.
    pub classify_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub records: usize,
    pub strategies: Vec<StrategyReport>,
    /// Matches across all strategies, counting a pair once per strategy.
    pub matched_pairs: usize,
    /// Distinct matched pairs fed to clustering.
    pub unique_edges: usize,
    pub cluster: ClusterStats,
    pub singleton_policy: SingletonPolicy,
    /// Groups reported, after the singleton policy.
    pub groups: usize,
    /// Groups with two or more members.
    pub linked_groups: usize,
    /// Records that matched nothing.
    pub singletons: usize,
    pub cluster_time: Duration,
    pub total_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub groups: Vec<Group>,
    pub report: RunReport,
}

/// Sizes every strategy against the candidate ceiling.
///
/// # Errors
///
/// Fails when the configuration is invalid.
pub fn plan(records: &RecordSet, config: &MatchingConfig) -> Result<RunPlan> {
    config.validate()?;
    let span = info_span!("plan", records = records.len());
    let _guard = span.enter();

    let ceiling = config.settings.max_candidate_pairs;
    let strategies = config
        .strategies
        .iter()
        .map(|strategy| {
            let candidate_pairs = count_candidates(records, strategy.blocking);
            let exceeds_ceiling = candidate_pairs > ceiling;
            if exceeds_ceiling {
                warn!(
                    strategy = %strategy.name,
                    candidate_pairs,
                    ceiling,
                    "strategy exceeds candidate ceiling"
                );
            } else {
                info!(strategy = %strategy.name, candidate_pairs, "strategy planned");
            }
            StrategyPlan {
                name: strategy.name.clone(),
                blocking: strategy.blocking,
                threshold: strategy.threshold,
                candidate_pairs,
                exceeds_ceiling,
            }
        })
        .collect();
    Ok(RunPlan {
        records: records.len(),
        ceiling,
        strategies,
    })
}

/// Resolves `records` into groups under `config`.
///
/// # Errors
///
/// Fails before touching any pair when the configuration is invalid or a
/// strategy exceeds `settings.max_candidate_pairs`.
pub fn run(records: &RecordSet, config: &MatchingConfig) -> Result<RunOutcome> {
    let run_start = Instant::now();
    let run_plan = plan(records, config)?;
    if let Some(excess) = run_plan.first_excess() {
        return Err(MatchError::TooManyCandidates {
            strategy: excess.name.clone(),
            candidate_pairs: excess.candidate_pairs,
            ceiling: run_plan.ceiling,
        }
        .into());
    }

    let comparator = Comparator::from_config(config)?;
    let ceiling = config.settings.max_candidate_pairs;
    let mut edges: BTreeSet<CandidatePair> = BTreeSet::new();
    let mut strategy_reports = Vec::with_capacity(config.strategies.len());

    // =========================================================================
    // Block each strategy, then compare and classify its candidates
    // =========================================================================
    for strategy in &config.strategies {
        let classifier = MatchClassifier::new(strategy, comparator.len())?;

        let block_start = Instant::now();
        let blocks = info_span!("block", strategy = %strategy.name)
            .in_scope(|| block_records(records, strategy, ceiling))?;
        let block_time = block_start.elapsed();

        let classify_start = Instant::now();
        let matches = info_span!("classify", strategy = %strategy.name)
            .in_scope(|| classifier.classify_blocks(&comparator, records, &blocks))?;
        let classify_time = classify_start.elapsed();
        let candidate_pairs = matches.histogram().total();

        info!(
            strategy = %strategy.name,
            candidate_pairs,
            threshold = strategy.threshold,
            matches = matches.len(),
            scores = %matches.histogram(),
            duration_ms = (block_time + classify_time).as_millis(),
            "strategy complete"
        );
        edges.extend(matches.pairs().iter().copied());
        strategy_reports.push(StrategyReport {
            name: strategy.name.clone(),
            threshold: strategy.threshold,
            candidate_pairs,
            matches: matches.len(),
            histogram: matches.histogram().clone(),
            block_time,
            classify_time,
        });
    }

    // =========================================================================
    // Cluster the merged edge set
    // =========================================================================
    let matched_pairs = strategy_reports.iter().map(|s| s.matches).sum();
    let unique_edges = edges.len();
    let policy = config.settings.singletons;
    let cluster_start = Instant::now();
    let clustering = info_span!("cluster", edges = unique_edges).in_scope(|| {
        let mut builder = ClusterBuilder::new(records);
        builder.add_pairs(edges)?;
        Ok::<_, linkage_cluster::ClusterError>(builder.build(policy))
    })?;
    let cluster_time = cluster_start.elapsed();

    let linked_groups = clustering.groups.iter().filter(|g| !g.is_singleton()).count();
    info!(
        records = records.len(),
        matched_pairs,
        unique_edges,
        unions = clustering.stats.unions,
        groups = clustering.groups.len(),
        linked_groups,
        singletons = clustering.singletons,
        duration_ms = cluster_time.as_millis(),
        "clustering complete"
    );

    let report = RunReport {
        records: records.len(),
        strategies: strategy_reports,
        matched_pairs,
        unique_edges,
        cluster: clustering.stats,
        singleton_policy: policy,
        groups: clustering.groups.len(),
        linked_groups,
        singletons: clustering.singletons,
        cluster_time,
        total_time: run_start.elapsed(),
    };
    Ok(RunOutcome {
        groups: clustering.groups,
        report,
    })
}
