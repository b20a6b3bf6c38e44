//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → PortfolioConfig (validated, immutable)
//!     → held in an ArcSwap inside the server state
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the live PortfolioConfig
//!     → the next request sees the new allowlist and limits
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::PortfolioConfig;
pub use schema::{
    AuthConfig, GoogleOAuthConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    RateLimitPolicy, SecurityConfig, StorageBackend, StorageConfig, TimeoutConfig,
};
