//! Parsing and validation of `ecd_sample_prep.toml` run configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`SamplePrepConfig`] describing the frame geometry, the capacity budget,
//! the diagnostic frames and the input/output file paths.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, DEFAULT_CONFIG_FILE};
pub use types::*;
