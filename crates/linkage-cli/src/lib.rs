//! Library side of the `contact-linkage` binary: logging setup and group writers.

pub mod logging;
pub mod output;
