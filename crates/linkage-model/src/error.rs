use thiserror::Error;

/// Errors raised while building records or validating matching configuration.
///
/// Every variant is a configuration or input-shape problem; none of them is
/// produced by missing attribute values, which degrade to a zero score instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("record key must not be empty")]
    EmptyRecordKey,

    #[error("duplicate record key: {key}")]
    DuplicateRecordKey { key: String },

    #[error("unknown field: {name}")]
    UnknownField { name: String },

    #[error("unknown similarity algorithm: {name}")]
    UnknownAlgorithm { name: String },

    #[error("configuration must define at least one comparison")]
    NoComparisons,

    #[error("configuration must define at least one blocking strategy")]
    NoStrategies,

    #[error("duplicate comparison label: {label}")]
    DuplicateLabel { label: String },

    #[error("duplicate strategy name: {name}")]
    DuplicateStrategy { name: String },

    #[error("strategy name must not be empty")]
    EmptyStrategyName,

    #[error("comparison '{label}': cutoff {cutoff} must be within [0, 1]")]
    InvalidCutoff { label: String, cutoff: String },

    #[error("comparison '{label}': similarity comparison requires '{parameter}'")]
    MissingParameter {
        label: String,
        parameter: &'static str,
    },

    #[error("comparison '{label}': '{parameter}' does not apply to {kind} comparisons")]
    UnexpectedParameter {
        label: String,
        parameter: &'static str,
        kind: &'static str,
    },

    #[error("comparison '{label}': similarity is not defined for flag field {field}")]
    SimilarityOnFlag { label: String, field: String },

    #[error("field blocking requires 'field'")]
    MissingBlockingField,

    #[error("'field' does not apply to full blocking")]
    UnexpectedBlockingField,

    #[error("strategy '{strategy}': threshold {threshold} must be between 1 and {max}")]
    InvalidThreshold {
        strategy: String,
        threshold: u32,
        max: usize,
    },

    #[error("max_candidate_pairs must be greater than zero")]
    ZeroCandidateCeiling,
}

impl ModelError {
    /// Returns true when the error stems from the matching configuration
    /// rather than from the record set.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::EmptyRecordKey | Self::DuplicateRecordKey { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
