use thiserror::Error;

/// A matched pair referenced a record outside the record set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("matched pair references unknown record key: {key}")]
    UnknownKey { key: String },

    #[error("matched pair references position {position}, but only {len} records are known")]
    PositionOutOfRange { position: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
