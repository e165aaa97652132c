pub mod config;
pub mod error;
pub mod profile;

pub use config::{Config, Requirement};
pub use error::*;
pub use profile::ProfileRecord;
