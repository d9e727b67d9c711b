//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `authority.api_key`.
pub const API_KEY_ENV: &str = "REQUEST_GATE_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let api_key = std::env::var(API_KEY_ENV).ok();
    parse_config(&content, api_key)
}

/// Parse and validate configuration text, applying an optional credential override.
pub fn parse_config(content: &str, api_key: Option<String>) -> Result<GateConfig, ConfigError> {
    let mut config: GateConfig = toml::from_str(content)?;

    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.authority.api_key = key;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
