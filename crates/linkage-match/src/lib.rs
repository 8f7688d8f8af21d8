//! Matching stages of contact linkage.
//!
//! [`blocking`] proposes candidate pairs per strategy, [`compare`] turns each
//! pair into a 0/1 feature vector, and [`classify`] keeps the pairs whose score
//! sum reaches the strategy threshold. [`MatchClassifier::classify_blocks`]
//! runs comparison and classification as one pass over streamed pairs.

pub mod blocking;
pub mod classify;
pub mod compare;
pub mod error;

pub use blocking::{Blocks, CandidateSet, block_records, count_candidates, generate_candidates};
pub use classify::{MatchClassifier, MatchSet, ScoreHistogram};
pub use compare::{Comparator, FeatureVector, score_field, similarity};
pub use error::{MatchError, Result};
