//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the generative backend key.
pub const ENV_BACKEND_KEY: &str = "FAL_KEY";
/// Environment variable holding the text-completion key.
pub const ENV_COMPLETION_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the listener address.
pub const ENV_BIND_ADDRESS: &str = "GENEDIT_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, overlay environment, and validate configuration.
///
/// Without a path the built-in defaults are used.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load(Some(path))
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay values from the environment. `lookup` abstracts `std::env::var`
/// so tests do not have to mutate process state.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(key) = present(ENV_BACKEND_KEY) {
        config.backend.api_key = Some(key);
    }
    if let Some(key) = present(ENV_COMPLETION_KEY) {
        config.completion.api_key = Some(key);
    }
    if let Some(addr) = present(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}
