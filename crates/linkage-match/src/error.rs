use linkage_model::ModelError;
use thiserror::Error;

/// Errors raised by the matching stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// A strategy would generate more candidate pairs than the configured ceiling.
    #[error(
        "strategy '{strategy}' would generate {candidate_pairs} candidate pairs, \
         above the ceiling of {ceiling}; tighten its blocking or raise max_candidate_pairs"
    )]
    TooManyCandidates {
        strategy: String,
        candidate_pairs: u64,
        ceiling: u64,
    },

    /// A pair refers to a position outside the record set it is compared against.
    #[error("candidate pair ({left}, {right}) refers to a record outside the set of {len}")]
    UnknownRecord { left: usize, right: usize, len: usize },

    /// The comparison or strategy configuration is invalid.
    #[error(transparent)]
    Config(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
