//! Declarative matching configuration.
//!
//! A configuration lists the field comparisons that make up every feature
//! vector, the blocking strategies that propose candidate pairs, and the
//! per-strategy score threshold a pair must reach to count as a match.
//! [`MatchingConfig::validate`] runs before any record is processed.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FieldName, ModelError};

/// Default ceiling on candidate pairs a single strategy may generate.
pub const DEFAULT_MAX_CANDIDATE_PAIRS: u64 = 50_000_000;

/// Whether records that matched nothing are reported as size-1 groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingletonPolicy {
    /// Every record appears in exactly one group, singletons included.
    #[default]
    Include,
    /// Only groups with two or more members are reported.
    Exclude,
}

/// String similarity algorithms available to fuzzy comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SimilarityAlgorithm {
    JaroWinkler,
    Jaro,
    Levenshtein,
}

impl SimilarityAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JaroWinkler => "jarowinkler",
            Self::Jaro => "jaro",
            Self::Levenshtein => "levenshtein",
        }
    }
}

impl FromStr for SimilarityAlgorithm {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "jarowinkler" => Ok(Self::JaroWinkler),
            "jaro" => Ok(Self::Jaro),
            "levenshtein" => Ok(Self::Levenshtein),
            _ => Err(ModelError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SimilarityAlgorithm {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SimilarityAlgorithm> for String {
    fn from(algorithm: SimilarityAlgorithm) -> Self {
        algorithm.as_str().to_string()
    }
}

impl fmt::Display for SimilarityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single field is scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparisonMethod {
    /// 1 when both values are present and equal.
    Exact { ignore_case: bool },
    /// 1 when both values are present and `algorithm(a, b) >= cutoff`.
    Similarity {
        algorithm: SimilarityAlgorithm,
        cutoff: f64,
    },
}

/// One position of the feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComparison", into = "RawComparison")]
pub struct ComparisonSpec {
    pub field: FieldName,
    pub label: Option<String>,
    pub method: ComparisonMethod,
}

impl ComparisonSpec {
    pub fn exact(field: FieldName) -> Self {
        Self {
            field,
            label: None,
            method: ComparisonMethod::Exact { ignore_case: false },
        }
    }

    pub fn similarity(field: FieldName, algorithm: SimilarityAlgorithm, cutoff: f64) -> Self {
        Self {
            field,
            label: None,
            method: ComparisonMethod::Similarity { algorithm, cutoff },
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn ignoring_case(mut self) -> Self {
        if let ComparisonMethod::Exact { ignore_case } = &mut self.method {
            *ignore_case = true;
        }
        self
    }

    /// Column label of this comparison in the feature vector.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.field.as_str())
    }

    /// Checks that a similarity comparison targets a text field with a
    /// cutoff inside [0, 1].
    pub fn validate(&self) -> Result<(), ModelError> {
        if let ComparisonMethod::Similarity { cutoff, .. } = self.method {
            if self.field.is_flag() {
                return Err(ModelError::SimilarityOnFlag {
                    label: self.label().to_string(),
                    field: self.field.to_string(),
                });
            }
            if !cutoff.is_finite() || !(0.0..=1.0).contains(&cutoff) {
                return Err(ModelError::InvalidCutoff {
                    label: self.label().to_string(),
                    cutoff: cutoff.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Validates a comparison list: non-empty, unique labels, each comparison valid.
pub fn validate_comparisons(comparisons: &[ComparisonSpec]) -> Result<(), ModelError> {
    if comparisons.is_empty() {
        return Err(ModelError::NoComparisons);
    }
    let mut labels = BTreeSet::new();
    for comparison in comparisons {
        let label = comparison.label();
        if !labels.insert(label) {
            return Err(ModelError::DuplicateLabel {
                label: label.to_string(),
            });
        }
        comparison.validate()?;
    }
    Ok(())
}

/// Flat on-disk shape of a comparison; `kind` selects which optional keys apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComparison {
    field: FieldName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    kind: RawComparisonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ignore_case: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    algorithm: Option<SimilarityAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cutoff: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawComparisonKind {
    Exact,
    Similarity,
}

impl TryFrom<RawComparison> for ComparisonSpec {
    type Error = ModelError;

    fn try_from(raw: RawComparison) -> Result<Self, Self::Error> {
        let label = raw
            .label
            .clone()
            .unwrap_or_else(|| raw.field.as_str().to_string());
        let method = match raw.kind {
            RawComparisonKind::Exact => {
                if raw.algorithm.is_some() {
                    return Err(ModelError::UnexpectedParameter {
                        label,
                        parameter: "algorithm",
                        kind: "exact",
                    });
                }
                if raw.cutoff.is_some() {
                    return Err(ModelError::UnexpectedParameter {
                        label,
                        parameter: "cutoff",
                        kind: "exact",
                    });
                }
                ComparisonMethod::Exact {
                    ignore_case: raw.ignore_case.unwrap_or(false),
                }
            }
            RawComparisonKind::Similarity => {
                if raw.ignore_case.is_some() {
                    return Err(ModelError::UnexpectedParameter {
                        label,
                        parameter: "ignore_case",
                        kind: "similarity",
                    });
                }
                let Some(algorithm) = raw.algorithm else {
                    return Err(ModelError::MissingParameter {
                        label,
                        parameter: "algorithm",
                    });
                };
                let Some(cutoff) = raw.cutoff else {
                    return Err(ModelError::MissingParameter {
                        label,
                        parameter: "cutoff",
                    });
                };
                ComparisonMethod::Similarity { algorithm, cutoff }
            }
        };
        Ok(Self {
            field: raw.field,
            label: raw.label,
            method,
        })
    }
}

impl From<ComparisonSpec> for RawComparison {
    fn from(spec: ComparisonSpec) -> Self {
        match spec.method {
            ComparisonMethod::Exact { ignore_case } => Self {
                field: spec.field,
                label: spec.label,
                kind: RawComparisonKind::Exact,
                ignore_case: ignore_case.then_some(true),
                algorithm: None,
                cutoff: None,
            },
            ComparisonMethod::Similarity { algorithm, cutoff } => Self {
                field: spec.field,
                label: spec.label,
                kind: RawComparisonKind::Similarity,
                ignore_case: None,
                algorithm: Some(algorithm),
                cutoff: Some(cutoff),
            },
        }
    }
}

/// How a strategy proposes candidate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlocking", into = "RawBlocking")]
pub enum BlockingSpec {
    /// Pair every two records sharing the same non-null value of `field`.
    Field { field: FieldName },
    /// Pair every two distinct records. Quadratic in the record count.
    Full,
}

/// On-disk shape of a blocking scheme: `{ kind = "field", field = ".." }` or
/// `{ kind = "full" }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBlocking {
    kind: RawBlockingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<FieldName>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawBlockingKind {
    Field,
    Full,
}

impl TryFrom<RawBlocking> for BlockingSpec {
    type Error = ModelError;

    fn try_from(raw: RawBlocking) -> Result<Self, Self::Error> {
        match (raw.kind, raw.field) {
            (RawBlockingKind::Field, Some(field)) => Ok(Self::Field { field }),
            (RawBlockingKind::Field, None) => Err(ModelError::MissingBlockingField),
            (RawBlockingKind::Full, None) => Ok(Self::Full),
            (RawBlockingKind::Full, Some(_)) => Err(ModelError::UnexpectedBlockingField),
        }
    }
}

impl From<BlockingSpec> for RawBlocking {
    fn from(spec: BlockingSpec) -> Self {
        match spec {
            BlockingSpec::Field { field } => Self {
                kind: RawBlockingKind::Field,
                field: Some(field),
            },
            BlockingSpec::Full => Self {
                kind: RawBlockingKind::Full,
                field: None,
            },
        }
    }
}

impl fmt::Display for BlockingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field } => write!(f, "block on {field}"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// A named blocking strategy and the score a pair needs to match under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySpec {
    pub name: String,
    pub threshold: u32,
    pub blocking: BlockingSpec,
}

impl StrategySpec {
    pub fn new(name: impl Into<String>, blocking: BlockingSpec, threshold: u32) -> Self {
        Self {
            name: name.into(),
            threshold,
            blocking,
        }
    }
}

/// Run-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchSettings {
    /// Largest candidate-pair count any one strategy may produce. Exceeding
    /// it fails the run before pairs are materialized.
    #[serde(default = "default_max_candidate_pairs")]
    pub max_candidate_pairs: u64,
    /// Whether unmatched records are reported as singleton groups.
    #[serde(default)]
    pub singletons: SingletonPolicy,
}

fn default_max_candidate_pairs() -> u64 {
    DEFAULT_MAX_CANDIDATE_PAIRS
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            max_candidate_pairs: DEFAULT_MAX_CANDIDATE_PAIRS,
            singletons: SingletonPolicy::default(),
        }
    }
}

/// Complete matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    #[serde(default)]
    pub settings: MatchSettings,
    pub comparisons: Vec<ComparisonSpec>,
    pub strategies: Vec<StrategySpec>,
}

impl MatchingConfig {
    /// The contact-matching setup: seven comparisons, two blocked strategies
    /// needing 4 of 7 and an exhaustive strategy needing 5 of 7.
    pub fn contacts_default() -> Self {
        Self {
            settings: MatchSettings::default(),
            comparisons: vec![
                ComparisonSpec::exact(FieldName::LastNameMp),
                ComparisonSpec::exact(FieldName::FirstNameMp),
                ComparisonSpec::exact(FieldName::FirstInitial),
                ComparisonSpec::exact(FieldName::EmailAddress),
                ComparisonSpec::exact(FieldName::PhoneNumberClean),
                ComparisonSpec::exact(FieldName::Title),
                ComparisonSpec::similarity(
                    FieldName::CompanyNameClean,
                    SimilarityAlgorithm::JaroWinkler,
                    0.7,
                ),
            ],
            strategies: vec![
                StrategySpec::new(
                    "last_name_phonetic",
                    BlockingSpec::Field {
                        field: FieldName::LastNameMp,
                    },
                    4,
                ),
                StrategySpec::new(
                    "phone_number",
                    BlockingSpec::Field {
                        field: FieldName::PhoneNumberClean,
                    },
                    4,
                ),
                StrategySpec::new("full", BlockingSpec::Full, 5),
            ],
        }
    }

    #[must_use]
    pub fn with_singletons(mut self, policy: SingletonPolicy) -> Self {
        self.settings.singletons = policy;
        self
    }

    #[must_use]
    pub fn with_max_candidate_pairs(mut self, ceiling: u64) -> Self {
        self.settings.max_candidate_pairs = ceiling;
        self
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: missing comparisons or strategies,
    /// duplicate labels or names, out-of-range cutoffs or thresholds,
    /// similarity on a flag field, or a zero candidate ceiling.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_comparisons(&self.comparisons)?;
        if self.strategies.is_empty() {
            return Err(ModelError::NoStrategies);
        }
        if self.settings.max_candidate_pairs == 0 {
            return Err(ModelError::ZeroCandidateCeiling);
        }

        let max = self.comparisons.len();
        let mut names = BTreeSet::new();
        for strategy in &self.strategies {
            if strategy.name.trim().is_empty() {
                return Err(ModelError::EmptyStrategyName);
            }
            if !names.insert(strategy.name.as_str()) {
                return Err(ModelError::DuplicateStrategy {
                    name: strategy.name.clone(),
                });
            }
            if strategy.threshold == 0 || strategy.threshold as usize > max {
                return Err(ModelError::InvalidThreshold {
                    strategy: strategy.name.clone(),
                    threshold: strategy.threshold,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self::contacts_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACTS_TOML: &str = r#"
[settings]
max_candidate_pairs = 1000
singletons = "exclude"

[[comparisons]]
field = "last_name_mp"
kind = "exact"

[[comparisons]]
field = "EMAIL_ADDRESS"
label = "email"
kind = "exact"
ignore_case = true

[[comparisons]]
field = "company_name_clean"
kind = "similarity"
algorithm = "jarowinkler"
cutoff = 0.7

[[strategies]]
name = "last_name_phonetic"
blocking = { kind = "field", field = "last_name_mp" }
threshold = 2

[[strategies]]
name = "full"
blocking = { kind = "full" }
threshold = 3
"#;

    #[test]
    fn default_config_is_valid() {
        let config = MatchingConfig::contacts_default();
        config.validate().unwrap();
        assert_eq!(config.comparisons.len(), 7);
        let thresholds: Vec<_> = config.strategies.iter().map(|s| s.threshold).collect();
        assert_eq!(thresholds, vec![4, 4, 5]);
        assert_eq!(config.settings.singletons, SingletonPolicy::Include);
    }

    #[test]
    fn parses_toml_configuration() {
        let config: MatchingConfig = toml::from_str(CONTACTS_TOML).unwrap();
        config.validate().unwrap();
        assert_eq!(config.settings.max_candidate_pairs, 1000);
        assert_eq!(config.settings.singletons, SingletonPolicy::Exclude);
        assert_eq!(config.comparisons[1].label(), "email");
        assert_eq!(config.comparisons[1].field, FieldName::EmailAddress);
        assert_eq!(
            config.comparisons[1].method,
            ComparisonMethod::Exact { ignore_case: true }
        );
        assert_eq!(
            config.comparisons[2].method,
            ComparisonMethod::Similarity {
                algorithm: SimilarityAlgorithm::JaroWinkler,
                cutoff: 0.7
            }
        );
        assert_eq!(
            config.strategies[0].blocking,
            BlockingSpec::Field {
                field: FieldName::LastNameMp
            }
        );
        assert_eq!(config.strategies[1].blocking, BlockingSpec::Full);
    }

    #[test]
    fn default_config_survives_toml() {
        let config = MatchingConfig::contacts_default();
        let text = toml::to_string(&config).unwrap();
        let parsed: MatchingConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn unknown_field_fails_to_parse() {
        let text = CONTACTS_TOML.replace("field = \"last_name_mp\"\nkind", "field = \"nickname\"\nkind");
        let err = toml::from_str::<MatchingConfig>(&text).unwrap_err();
        assert!(err.to_string().contains("unknown field: nickname"), "{err}");
    }

    #[test]
    fn similarity_requires_cutoff() {
        let text = CONTACTS_TOML.replace("cutoff = 0.7\n", "");
        let err = toml::from_str::<MatchingConfig>(&text).unwrap_err();
        assert!(err.to_string().contains("requires 'cutoff'"), "{err}");
    }

    #[test]
    fn threshold_above_field_count_is_rejected() {
        let mut config = MatchingConfig::contacts_default();
        config.strategies[2].threshold = 8;
        assert_eq!(
            config.validate(),
            Err(ModelError::InvalidThreshold {
                strategy: "full".to_string(),
                threshold: 8,
                max: 7
            })
        );
        config.strategies[2].threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn cutoff_outside_unit_interval_is_rejected() {
        let mut config = MatchingConfig::contacts_default();
        config.comparisons[6] = ComparisonSpec::similarity(
            FieldName::CompanyNameClean,
            SimilarityAlgorithm::Jaro,
            1.5,
        );
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidCutoff { .. })
        ));
    }

    #[test]
    fn duplicate_labels_and_names_are_rejected() {
        let mut config = MatchingConfig::contacts_default();
        config.comparisons.push(ComparisonSpec::exact(FieldName::Title));
        assert_eq!(
            config.validate(),
            Err(ModelError::DuplicateLabel {
                label: "title".to_string()
            })
        );

        let mut config = MatchingConfig::contacts_default();
        config.strategies[1].name = "full".to_string();
        assert!(matches!(
            config.validate(),
            Err(ModelError::DuplicateStrategy { .. })
        ));
    }

    #[test]
    fn similarity_on_flags_is_rejected() {
        let mut config = MatchingConfig::contacts_default();
        config.comparisons.push(ComparisonSpec::similarity(
            FieldName::IsEmailValid,
            SimilarityAlgorithm::Jaro,
            0.5,
        ));
        assert!(matches!(
            config.validate(),
            Err(ModelError::SimilarityOnFlag { .. })
        ));
    }

    #[test]
    fn algorithm_names_are_lenient() {
        assert_eq!(
            "Jaro_Winkler".parse::<SimilarityAlgorithm>().unwrap(),
            SimilarityAlgorithm::JaroWinkler
        );
        assert!("soundex".parse::<SimilarityAlgorithm>().is_err());
    }
}
