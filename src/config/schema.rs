//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the portfolio server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the portfolio server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rate limiting policies.
    pub rate_limit: RateLimitConfig,

    /// Sign-in, session and allowlist settings.
    pub auth: AuthConfig,

    /// Content document storage.
    pub storage: StorageConfig,

    /// Security hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// A fixed-window limit: at most `max_requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitPolicy {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl RateLimitPolicy {
    pub const fn new(window_secs: u64, max_requests: u32) -> Self {
        Self {
            window_secs,
            max_requests,
        }
    }

    /// Generic read policy: 100 requests per 15 minutes.
    pub const fn api() -> Self {
        Self::new(15 * 60, 100)
    }

    /// Write policy: 10 requests per minute.
    pub const fn write() -> Self {
        Self::new(60, 10)
    }

    /// Sign-in attempts: 5 per 15 minutes.
    pub const fn auth() -> Self {
        Self::new(15 * 60, 5)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn window_ms(&self) -> u64 {
        self.window_secs.saturating_mul(1000)
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Applied to content reads.
    pub api: RateLimitPolicy,

    /// Applied to content writes and deletes.
    pub write: RateLimitPolicy,

    /// Applied to sign-in start and callback.
    pub auth: RateLimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api: RateLimitPolicy::api(),
            write: RateLimitPolicy::write(),
            auth: RateLimitPolicy::auth(),
        }
    }
}

/// Sign-in and session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Comma-separated list of emails allowed to edit content.
    pub allowed_emails: String,

    /// HMAC secret used to sign session tokens.
    pub session_secret: String,

    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,

    /// Public base URL of the site, used for OAuth redirects and the sitemap.
    pub public_url: String,

    /// Google OAuth client credentials.
    pub google: GoogleOAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_emails: String::new(),
            session_secret: String::new(),
            session_ttl_secs: 24 * 60 * 60,
            public_url: "http://localhost:3000".to_string(),
            google: GoogleOAuthConfig::default(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Cookies get the `Secure` attribute when the site is served over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

/// Google OAuth client credentials.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Where the content document lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart.
    Memory,
    /// JSON file on disk.
    #[default]
    File,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Path of the collection file for the `file` backend.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "data/portfolio.json".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Take the client address from X-Forwarded-For / X-Real-IP.
    /// Only enable behind a proxy that overwrites these headers.
    pub trust_forwarded_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 1024 * 1024, // 1MB
            trust_forwarded_headers: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
