//! Shared server state.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::auth::{Allowlist, GoogleProvider, IdentityProvider, SessionKeys};
use crate::config::PortfolioConfig;
use crate::content::store::collection_from_config;
use crate::content::{ContentAccessor, DocumentCollection};
use crate::security::RateLimiters;

/// Application state injected into handlers.
///
/// The configuration is swapped atomically on reload. Limiters, session keys
/// and the store live for the lifetime of the server.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ArcSwap<PortfolioConfig>>,
    pub content: ContentAccessor,
    pub limiters: Arc<RateLimiters>,
    pub sessions: Arc<SessionKeys>,
    pub provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        config: PortfolioConfig,
        collection: Arc<dyn DocumentCollection>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let ttl = config.auth.session_ttl();
        let sessions = if config.auth.session_secret.is_empty() {
            tracing::warn!("No session secret configured, sessions will not survive a restart");
            SessionKeys::ephemeral(ttl)
        } else {
            SessionKeys::new(config.auth.session_secret.as_bytes(), ttl)
        };

        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            content: ContentAccessor::new(collection),
            limiters: Arc::new(RateLimiters::new()),
            sessions: Arc::new(sessions),
            provider,
        }
    }

    /// State with the store and identity provider named by `config`.
    pub fn from_config(config: PortfolioConfig) -> Self {
        let collection: Arc<dyn DocumentCollection> =
            Arc::from(collection_from_config(&config.storage));
        let provider: Arc<dyn IdentityProvider> = Arc::new(GoogleProvider::new(&config.auth.google));
        Self::new(config, collection, provider)
    }

    /// The live configuration.
    pub fn config(&self) -> Arc<PortfolioConfig> {
        self.config.load_full()
    }

    /// Replace the live configuration. The session secret keeps its startup value.
    pub fn apply_config(&self, config: PortfolioConfig) {
        let allowed = Allowlist::parse(&config.auth.allowed_emails).len();
        self.config.store(Arc::new(config));
        tracing::info!(allowed_emails = allowed, "Applied new configuration");
    }

    /// The allowlist as currently configured.
    pub fn allowlist(&self) -> Allowlist {
        Allowlist::parse(&self.config.load().auth.allowed_emails)
    }
}
