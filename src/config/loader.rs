//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::PortfolioConfig;
use crate::config::validation::{validate_config, ValidationError};

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

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<PortfolioConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: PortfolioConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<PortfolioConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = PortfolioConfig::default();
            apply_env_overrides(&mut config);
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Override config values with process environment variables.
pub fn apply_env_overrides(config: &mut PortfolioConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Override config values using `lookup` as the environment.
pub fn apply_overrides_from<F>(config: &mut PortfolioConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let targets: [(&str, &mut String); 7] = [
        ("ALLOWED_EMAILS", &mut config.auth.allowed_emails),
        ("SESSION_SECRET", &mut config.auth.session_secret),
        ("GOOGLE_CLIENT_ID", &mut config.auth.google.client_id),
        ("GOOGLE_CLIENT_SECRET", &mut config.auth.google.client_secret),
        ("PUBLIC_URL", &mut config.auth.public_url),
        ("PORTFOLIO_BIND_ADDRESS", &mut config.listener.bind_address),
        ("PORTFOLIO_STORAGE_PATH", &mut config.storage.path),
    ];

    for (key, target) in targets {
        if let Some(value) = lookup(key) {
            tracing::debug!(key, "Applying environment override");
            *target = value;
        }
    }
}
