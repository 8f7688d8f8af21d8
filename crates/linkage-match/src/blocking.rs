//! Candidate pair generation.
//!
//! A field strategy pairs records that share a non-null value of its field; a
//! full strategy pairs every two records. Both are the same computation over a
//! list of blocks, full blocking being a single block holding every record.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use linkage_model::{BlockingSpec, CandidatePair, RecordSet, StrategySpec};

use crate::error::{MatchError, Result};

/// Candidate pairs of one strategy, sorted and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    strategy: String,
    pairs: Vec<CandidatePair>,
}

impl CandidateSet {
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn pairs(&self) -> &[CandidatePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Groups record positions into blocks of two or more records.
fn blocks(records: &RecordSet, blocking: BlockingSpec) -> Vec<Vec<usize>> {
    match blocking {
        BlockingSpec::Full => {
            if records.len() < 2 {
                Vec::new()
            } else {
                vec![(0..records.len()).collect()]
            }
        }
        BlockingSpec::Field { field } => {
            let mut by_value: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            let mut nulls = 0usize;
            for (idx, record) in records.records().iter().enumerate() {
                match record.value(field) {
                    Some(value) => by_value.entry(value).or_default().push(idx),
                    None => nulls += 1,
                }
            }
            if nulls > 0 {
                debug!(field = %field, records = nulls, "records with null blocking field left unpaired");
            }
            by_value
                .into_values()
                .filter(|block| block.len() > 1)
                .collect()
        }
    }
}

fn pairs_in(block_len: usize) -> u64 {
    let n = block_len as u64;
    n.saturating_mul(n.saturating_sub(1)) / 2
}

/// Number of candidate pairs a blocking scheme yields, without generating them.
pub fn count_candidates(records: &RecordSet, blocking: BlockingSpec) -> u64 {
    match blocking {
        BlockingSpec::Full => pairs_in(records.len()),
        BlockingSpec::Field { .. } => blocks(records, blocking)
            .iter()
            .map(|block| pairs_in(block.len()))
            .fold(0u64, u64::saturating_add),
    }
}

/// Blocks of one strategy, sized against the ceiling but not yet expanded
/// into pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocks {
    strategy: String,
    blocks: Vec<Vec<usize>>,
    candidate_pairs: u64,
}

impl Blocks {
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Number of blocks holding two or more records.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn candidate_pairs(&self) -> u64 {
        self.candidate_pairs
    }

    /// Streams every candidate pair in parallel, in no particular order.
    pub fn par_pairs(&self) -> impl ParallelIterator<Item = CandidatePair> + '_ {
        self.blocks.par_iter().flat_map(|block| {
            (0..block.len()).into_par_iter().flat_map_iter(move |i| {
                let left = block[i];
                block[i + 1..]
                    .iter()
                    .filter_map(move |&right| CandidatePair::new(left, right))
            })
        })
    }

    /// Materializes the pairs, sorted.
    pub fn into_candidates(self) -> CandidateSet {
        let mut pairs: Vec<CandidatePair> = self.par_pairs().collect();
        pairs.par_sort_unstable();
        CandidateSet {
            strategy: self.strategy,
            pairs,
        }
    }
}

/// Splits the records into the blocks of a strategy.
///
/// # Errors
///
/// Returns [`MatchError::TooManyCandidates`] when the blocks would yield more
/// than `ceiling` pairs.
pub fn block_records(records: &RecordSet, strategy: &StrategySpec, ceiling: u64) -> Result<Blocks> {
    let blocks = blocks(records, strategy.blocking);
    let candidate_pairs = blocks
        .iter()
        .map(|block| pairs_in(block.len()))
        .fold(0u64, u64::saturating_add);
    if candidate_pairs > ceiling {
        return Err(MatchError::TooManyCandidates {
            strategy: strategy.name.clone(),
            candidate_pairs,
            ceiling,
        });
    }
    debug!(
        strategy = %strategy.name,
        blocking = %strategy.blocking,
        blocks = blocks.len(),
        candidate_pairs,
        "blocked records"
    );
    Ok(Blocks {
        strategy: strategy.name.clone(),
        blocks,
        candidate_pairs,
    })
}

/// Generates the candidate pairs of a strategy.
///
/// # Errors
///
/// Returns [`MatchError::TooManyCandidates`] when the pair count exceeds
/// `ceiling`; the check happens before any pair is materialized.
pub fn generate_candidates(
    records: &RecordSet,
    strategy: &StrategySpec,
    ceiling: u64,
) -> Result<CandidateSet> {
    Ok(block_records(records, strategy, ceiling)?.into_candidates())
}
