//! Input loading for contact linkage: the enriched contact table and the
//! matching configuration file.

pub mod config_file;
pub mod contacts;
pub mod error;

pub use config_file::load_matching_config;
pub use contacts::{DEFAULT_KEY_COLUMN, read_contacts, read_contacts_csv};
pub use error::{IngestError, Result};
