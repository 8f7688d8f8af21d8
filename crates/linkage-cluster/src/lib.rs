//! Entity resolution over matched pairs.

pub mod builder;
pub mod error;
pub mod union_find;

pub use builder::{ClusterBuilder, ClusterStats, Clustering, cluster};
pub use error::{ClusterError, Result};
pub use union_find::UnionFind;
