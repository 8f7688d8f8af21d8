//! Matching configuration files.

use std::path::Path;

use tracing::debug;

use linkage_model::MatchingConfig;

use crate::error::{IngestError, Result};

/// Loads and validates a TOML matching configuration.
///
/// Omitted `[settings]` keys take their defaults.
pub fn load_matching_config(path: &Path) -> Result<MatchingConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| IngestError::file_read(path, e))?;
    let config: MatchingConfig = toml::from_str(&contents).map_err(|e| IngestError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate().map_err(|e| IngestError::InvalidConfig {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(
        path = %path.display(),
        comparisons = config.comparisons.len(),
        strategies = config.strategies.len(),
        "loaded matching configuration"
    );
    Ok(config)
}
