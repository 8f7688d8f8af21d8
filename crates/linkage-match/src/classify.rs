//! Threshold classification of feature vectors.

use std::fmt;

use rayon::prelude::*;

use linkage_model::{CandidatePair, ModelError, RecordSet, StrategySpec};

use crate::blocking::Blocks;
use crate::compare::{Comparator, FeatureVector};
use crate::error::{MatchError, Result};

/// Count of candidate pairs per score sum, for sums `0..=field_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreHistogram {
    counts: Vec<usize>,
}

impl ScoreHistogram {
    pub fn new(field_count: usize) -> Self {
        Self {
            counts: vec![0; field_count + 1],
        }
    }

    pub fn record(&mut self, score: u32) {
        let idx = score as usize;
        if idx >= self.counts.len() {
            self.counts.resize(idx + 1, 0);
        }
        self.counts[idx] += 1;
    }

    /// Adds the counts of `other` into this histogram.
    pub fn merge(&mut self, other: &ScoreHistogram) {
        if other.counts.len() > self.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (slot, count) in self.counts.iter_mut().zip(&other.counts) {
            *slot += count;
        }
    }

    pub fn count(&self, score: u32) -> usize {
        self.counts.get(score as usize).copied().unwrap_or(0)
    }

    /// Pairs scoring at least `threshold`.
    pub fn at_least(&self, threshold: u32) -> usize {
        self.counts.iter().skip(threshold as usize).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Non-empty buckets, highest score first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, count)| **count > 0)
            .map(|(score, count)| (score as u32, *count))
    }
}

impl fmt::Display for ScoreHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (score, count) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{score}:{count}")?;
            first = false;
        }
        Ok(())
    }
}

/// Matches of one strategy plus the score distribution of its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    strategy: String,
    threshold: u32,
    pairs: Vec<CandidatePair>,
    histogram: ScoreHistogram,
}

impl MatchSet {
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn pairs(&self) -> &[CandidatePair] {
        &self.pairs
    }

    pub fn histogram(&self) -> &ScoreHistogram {
        &self.histogram
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Accepts a pair when its score sum reaches the strategy threshold.
#[derive(Debug, Clone)]
pub struct MatchClassifier {
    strategy: String,
    threshold: u32,
    field_count: usize,
}

impl MatchClassifier {
    /// # Errors
    ///
    /// Fails unless `1 <= threshold <= field_count`.
    pub fn new(strategy: &StrategySpec, field_count: usize) -> Result<Self> {
        if strategy.threshold == 0 || strategy.threshold as usize > field_count {
            return Err(ModelError::InvalidThreshold {
                strategy: strategy.name.clone(),
                threshold: strategy.threshold,
                max: field_count,
            }
            .into());
        }
        Ok(Self {
            strategy: strategy.name.clone(),
            threshold: strategy.threshold,
            field_count,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn is_match(&self, vector: &FeatureVector) -> bool {
        vector.total() >= self.threshold
    }

    pub fn classify(&self, vectors: &[FeatureVector]) -> MatchSet {
        let mut histogram = ScoreHistogram::new(self.field_count);
        let mut pairs = Vec::new();
        for vector in vectors {
            let total = vector.total();
            histogram.record(total);
            if total >= self.threshold {
                pairs.push(vector.pair());
            }
        }
        self.match_set(pairs, histogram)
    }

    /// Scores and classifies every pair of `blocks` in one parallel pass.
    ///
    /// Only matched pairs are kept, so memory follows the match count rather
    /// than the candidate count. Matches come back sorted.
    ///
    /// # Errors
    ///
    /// Fails when a pair refers to a record outside `records`.
    pub fn classify_blocks(
        &self,
        comparator: &Comparator,
        records: &RecordSet,
        blocks: &Blocks,
    ) -> Result<MatchSet> {
        let empty = || (Vec::new(), ScoreHistogram::new(self.field_count));
        let (mut pairs, histogram) = blocks
            .par_pairs()
            .try_fold(empty, |(mut pairs, mut histogram), pair| {
                let total = comparator.score(records, pair)?;
                histogram.record(total);
                if total >= self.threshold {
                    pairs.push(pair);
                }
                Ok::<_, MatchError>((pairs, histogram))
            })
            .try_reduce(empty, |(mut pairs, mut histogram), (more, counts)| {
                pairs.extend(more);
                histogram.merge(&counts);
                Ok((pairs, histogram))
            })?;
        pairs.par_sort_unstable();
        Ok(self.match_set(pairs, histogram))
    }

    fn match_set(&self, pairs: Vec<CandidatePair>, histogram: ScoreHistogram) -> MatchSet {
        MatchSet {
            strategy: self.strategy.clone(),
            threshold: self.threshold,
            pairs,
            histogram,
        }
    }
}
