//! Error types for contact input loading.

use std::path::PathBuf;

use linkage_model::ModelError;
use thiserror::Error;

/// Errors that can occur while loading records or configuration.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The CSV has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// The key column is not among the headers.
    #[error("key column '{column}' not found in {path}")]
    MissingKeyColumn { column: String, path: PathBuf },

    /// A data row has a blank key.
    #[error("row {row} of {path} has an empty key")]
    EmptyKey { row: usize, path: PathBuf },

    /// The records do not form a valid record set.
    #[error("invalid records in {path}: {source}")]
    Records {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    /// The configuration file is not valid TOML for a matching configuration.
    #[error("failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configuration parsed but is inconsistent.
    #[error("invalid configuration {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

impl IngestError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the problem lies in the matching configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::InvalidConfig { .. })
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
