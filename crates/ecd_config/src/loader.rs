//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::SamplePrepConfig;
use std::path::Path;

/// File name used when no configuration path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "ecd_sample_prep.toml";

/// Loads and validates a run configuration from a file.
pub fn load_config(path: &Path) -> Result<SamplePrepConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a run configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SamplePrepConfig, ConfigError> {
    let config: SamplePrepConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &SamplePrepConfig) -> Result<(), ConfigError> {
    if config.cells_per_frame == 0 {
        return Err(ConfigError::ValidationError(
            "cells_per_frame must be at least 1".to_string(),
        ));
    }
    if config.data_frames == 0 {
        return Err(ConfigError::ValidationError(
            "data_frames must be at least 1".to_string(),
        ));
    }
    for (name, path) in [
        ("fragment_file", &config.fragment_file),
        ("distribution_file", &config.distribution_file),
        ("output_file", &config.output_file),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField(name.to_string()));
        }
    }
    if !config.diagnostic_values.is_empty() && config.diagnostic_constant.is_some() {
        return Err(ConfigError::ValidationError(
            "diagnostic_values and diagnostic_constant are mutually exclusive".to_string(),
        ));
    }
    if config.diagnostic_frames > 0 && config.diagnostic_constant.is_none() {
        return Err(ConfigError::MissingField("diagnostic_constant".to_string()));
    }
    Ok(())
}
