//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, limits > 0, addresses parse)
//! - Check that secrets are strong enough to sign sessions
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PortfolioConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{PortfolioConfig, RateLimitPolicy, StorageBackend};

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &PortfolioConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    check_policy(&mut errors, "rate_limit.api", &config.rate_limit.api);
    check_policy(&mut errors, "rate_limit.write", &config.rate_limit.write);
    check_policy(&mut errors, "rate_limit.auth", &config.rate_limit.auth);

    // An empty secret is replaced with an ephemeral one at startup.
    let secret = &config.auth.session_secret;
    if !secret.is_empty() && secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::new(
            "auth.session_secret",
            format!("must be at least {MIN_SECRET_LEN} bytes"),
        ));
    }

    if config.auth.session_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.session_ttl_secs", "must be greater than 0"));
    }

    match Url::parse(&config.auth.public_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::new(
            "auth.public_url",
            format!("'{}' is not an http(s) URL", config.auth.public_url),
        )),
    }

    if config.storage.backend == StorageBackend::File && config.storage.path.trim().is_empty() {
        errors.push(ValidationError::new("storage.path", "required for the file backend"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_policy(errors: &mut Vec<ValidationError>, field: &'static str, policy: &RateLimitPolicy) {
    if policy.window_secs == 0 {
        errors.push(ValidationError::new(field, "window_secs must be greater than 0"));
    }
    if policy.max_requests == 0 {
        errors.push(ValidationError::new(field, "max_requests must be greater than 0"));
    }
}
