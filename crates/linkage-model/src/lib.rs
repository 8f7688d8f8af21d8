//! Data model for contact linkage.
//!
//! Records arrive already validated and normalized; this crate only describes
//! them, the candidate pairs and groups derived from them, and the declarative
//! matching configuration.

pub mod config;
pub mod error;
pub mod field;
pub mod ids;
pub mod pair;
pub mod record;

pub use config::{
    BlockingSpec, ComparisonMethod, ComparisonSpec, DEFAULT_MAX_CANDIDATE_PAIRS, MatchSettings,
    MatchingConfig, SimilarityAlgorithm, SingletonPolicy, StrategySpec, validate_comparisons,
};
pub use error::{ModelError, Result};
pub use field::FieldName;
pub use ids::RecordKey;
pub use pair::{CandidatePair, Group};
pub use record::{ContactRecord, RecordSet, parse_flag};
