//! Unified error type for a linkage run.

use linkage_cluster::ClusterError;
use linkage_ingest::IngestError;
use linkage_match::MatchError;
use linkage_model::ModelError;
use thiserror::Error;

/// How a failed run should be understood by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The matching configuration is unusable; nothing was processed.
    Configuration,
    /// A strategy would generate more candidate pairs than allowed.
    Scale,
    /// Input files could not be read or are malformed.
    Input,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid matching configuration: {0}")]
    Config(ModelError),

    /// The record set itself is malformed, e.g. duplicate keys.
    #[error("invalid record set: {0}")]
    Records(ModelError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        if err.is_configuration() {
            Self::Config(err)
        } else {
            Self::Records(err)
        }
    }
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Match(MatchError::TooManyCandidates { .. }) => ErrorCategory::Scale,
            Self::Records(_) => ErrorCategory::Input,
            Self::Config(_) | Self::Match(_) | Self::Cluster(_) => ErrorCategory::Configuration,
            Self::Ingest(err) if err.is_configuration() => ErrorCategory::Configuration,
            Self::Ingest(_) => ErrorCategory::Input,
        }
    }

    /// Operator hint for resolving the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.category() {
            ErrorCategory::Scale => Some(
                "Block the strategy on a more selective field or raise settings.max_candidate_pairs.",
            ),
            ErrorCategory::Configuration => {
                Some("Run `contact-linkage config --config <FILE>` to check the configuration.")
            }
            ErrorCategory::Input => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let scale = PipelineError::from(MatchError::TooManyCandidates {
            strategy: "full".to_string(),
            candidate_pairs: 10,
            ceiling: 5,
        });
        assert_eq!(scale.category(), ErrorCategory::Scale);
        assert!(scale.suggestion().is_some());

        let config = PipelineError::from(ModelError::NoStrategies);
        assert_eq!(config.category(), ErrorCategory::Configuration);

        let wrapped = PipelineError::from(MatchError::from(ModelError::NoComparisons));
        assert_eq!(wrapped.category(), ErrorCategory::Configuration);

        let duplicate = PipelineError::from(ModelError::DuplicateRecordKey {
            key: "k".to_string(),
        });
        assert_eq!(duplicate.category(), ErrorCategory::Input);
        assert!(duplicate.suggestion().is_none());
        assert_eq!(duplicate.to_string(), "invalid record set: duplicate record key: k");
        assert_eq!(
            config.to_string(),
            "invalid matching configuration: configuration must define at least one blocking strategy"
        );

        let unknown = PipelineError::from(ClusterError::UnknownKey {
            key: "k".to_string(),
        });
        assert_eq!(unknown.category(), ErrorCategory::Configuration);

        let outside = PipelineError::from(MatchError::UnknownRecord {
            left: 0,
            right: 9,
            len: 2,
        });
        assert_eq!(outside.category(), ErrorCategory::Configuration);
    }
}
