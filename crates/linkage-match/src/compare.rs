//! Field comparisons and feature vectors.

use rapidfuzz::distance::{jaro, jaro_winkler, levenshtein};
use rayon::prelude::*;
use tracing::trace;

use linkage_model::{
    CandidatePair, ComparisonMethod, ComparisonSpec, ContactRecord, MatchingConfig, RecordSet,
    SimilarityAlgorithm, validate_comparisons,
};

use crate::error::{MatchError, Result};

/// Per-field 0/1 scores of one candidate pair, in comparator order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    pair: CandidatePair,
    scores: Box<[u8]>,
}

impl FeatureVector {
    pub fn pair(&self) -> CandidatePair {
        self.pair
    }

    pub fn scores(&self) -> &[u8] {
        &self.scores
    }

    /// Number of fields that agreed.
    pub fn total(&self) -> u32 {
        self.scores.iter().map(|&score| u32::from(score)).sum()
    }
}

/// Similarity of two strings in [0, 1].
pub fn similarity(algorithm: SimilarityAlgorithm, a: &str, b: &str) -> f64 {
    match algorithm {
        SimilarityAlgorithm::JaroWinkler => jaro_winkler::similarity(a.chars(), b.chars()),
        SimilarityAlgorithm::Jaro => jaro::similarity(a.chars(), b.chars()),
        SimilarityAlgorithm::Levenshtein => {
            levenshtein::normalized_similarity(a.chars(), b.chars())
        }
    }
}

fn equal_ignoring_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Scores one field. A null or blank value on either side always scores 0.
pub fn score_field(method: ComparisonMethod, left: Option<&str>, right: Option<&str>) -> u8 {
    let (Some(a), Some(b)) = (left, right) else {
        return 0;
    };
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0;
    }
    let agrees = match method {
        ComparisonMethod::Exact { ignore_case: false } => a == b,
        ComparisonMethod::Exact { ignore_case: true } => equal_ignoring_case(a, b),
        ComparisonMethod::Similarity { algorithm, cutoff } => similarity(algorithm, a, b) >= cutoff,
    };
    u8::from(agrees)
}

/// Computes feature vectors for candidate pairs under a fixed comparison list.
#[derive(Debug, Clone)]
pub struct Comparator {
    comparisons: Vec<ComparisonSpec>,
}

impl Comparator {
    /// # Errors
    ///
    /// Fails when the list is empty, labels repeat, or a similarity comparison
    /// is malformed.
    pub fn new(comparisons: Vec<ComparisonSpec>) -> Result<Self> {
        validate_comparisons(&comparisons)?;
        Ok(Self { comparisons })
    }

    pub fn from_config(config: &MatchingConfig) -> Result<Self> {
        Self::new(config.comparisons.clone())
    }

    /// Feature labels, one per score position.
    pub fn labels(&self) -> Vec<&str> {
        self.comparisons.iter().map(ComparisonSpec::label).collect()
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    fn resolve<'r>(
        records: &'r RecordSet,
        pair: CandidatePair,
    ) -> Result<(&'r ContactRecord, &'r ContactRecord)> {
        match (records.get(pair.left()), records.get(pair.right())) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(MatchError::UnknownRecord {
                left: pair.left(),
                right: pair.right(),
                len: records.len(),
            }),
        }
    }

    fn field_scores<'c>(
        &'c self,
        pair: CandidatePair,
        left: &'c ContactRecord,
        right: &'c ContactRecord,
    ) -> impl Iterator<Item = u8> + 'c {
        self.comparisons.iter().map(move |comparison| {
            let a = left.value(comparison.field);
            let b = right.value(comparison.field);
            if a.is_none() || b.is_none() {
                trace!(
                    left = pair.left(),
                    right = pair.right(),
                    field = %comparison.field,
                    "null compared field scores 0"
                );
            }
            score_field(comparison.method, a, b)
        })
    }

    /// # Errors
    ///
    /// Fails with [`MatchError::UnknownRecord`] when either side of `pair` is
    /// not in `records`.
    pub fn compare(&self, records: &RecordSet, pair: CandidatePair) -> Result<FeatureVector> {
        let (left, right) = Self::resolve(records, pair)?;
        Ok(FeatureVector {
            pair,
            scores: self.field_scores(pair, left, right).collect(),
        })
    }

    /// Score sum of one pair, without keeping the per-field scores.
    ///
    /// # Errors
    ///
    /// Same as [`Comparator::compare`].
    pub fn score(&self, records: &RecordSet, pair: CandidatePair) -> Result<u32> {
        let (left, right) = Self::resolve(records, pair)?;
        Ok(self
            .field_scores(pair, left, right)
            .map(u32::from)
            .sum())
    }

    /// Compares every pair in parallel; output order follows `pairs`.
    ///
    /// # Errors
    ///
    /// Same as [`Comparator::compare`].
    pub fn compare_all(
        &self,
        records: &RecordSet,
        pairs: &[CandidatePair],
    ) -> Result<Vec<FeatureVector>> {
        pairs
            .par_iter()
            .map(|&pair| self.compare(records, pair))
            .collect()
    }
}
