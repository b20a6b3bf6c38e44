//! Shared utilities for integration testing.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

use portfolio_server::auth::{Identity, IdentityProvider, ProviderError, ProviderProfile};
use portfolio_server::config::{PortfolioConfig, StorageBackend};
use portfolio_server::content::{DocumentCollection, MemoryCollection, StoreError};
use portfolio_server::http::{AppState, HttpServer};
use portfolio_server::lifecycle::Shutdown;

pub const EDITOR: &str = "a@x.com";
pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub config_tx: mpsc::UnboundedSender<PortfolioConfig>,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A session token as issued at sign-in for `email`.
    pub fn token_for(&self, email: &str) -> String {
        let identity = Identity {
            id: format!("sub-{email}"),
            email: email.to_string(),
            allowed_at_issue_time: self.state.allowlist().contains(email),
        };
        self.state.sessions.issue(&identity).unwrap()
    }

    /// Push a new configuration through the reload channel and wait until it is live.
    pub async fn reload(&self, config: PortfolioConfig) {
        let expected = config.auth.allowed_emails.clone();
        self.config_tx.send(config).unwrap();
        for _ in 0..100 {
            if self.state.config().auth.allowed_emails == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("configuration was not applied");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn test_config() -> PortfolioConfig {
    let mut config = PortfolioConfig::default();
    config.auth.allowed_emails = EDITOR.to_string();
    config.auth.session_secret = SECRET.to_string();
    config.auth.public_url = "http://127.0.0.1".to_string();
    config.storage.backend = StorageBackend::Memory;
    config
}

pub async fn spawn_server(config: PortfolioConfig) -> TestServer {
    spawn_server_with(
        config,
        Arc::new(MemoryCollection::new()),
        Arc::new(ScriptedProvider::with_email(EDITOR)),
    )
    .await
}

pub async fn spawn_server_with(
    config: PortfolioConfig,
    collection: Arc<dyn DocumentCollection>,
    provider: Arc<dyn IdentityProvider>,
) -> TestServer {
    let state = AppState::new(config, collection, provider);
    let server = HttpServer::from_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestServer {
        addr,
        state,
        config_tx,
        shutdown,
    }
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Identity provider returning a fixed profile for any code.
pub struct ScriptedProvider {
    profile: Option<ProviderProfile>,
}

impl ScriptedProvider {
    pub fn with_email(email: &str) -> Self {
        Self {
            profile: Some(ProviderProfile {
                subject: "google-123".to_string(),
                email: Some(email.to_string()),
                email_verified: Some(true),
                name: Some("Test User".to_string()),
            }),
        }
    }

    pub fn failing() -> Self {
        Self { profile: None }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            "https://provider.test/authorize",
            &[("state", state), ("redirect_uri", redirect_uri)],
        )
        .map_err(|e| ProviderError::Refused(e.to_string()))
    }

    async fn exchange(&self, _code: &str, _redirect_uri: &str) -> Result<ProviderProfile, ProviderError> {
        self.profile
            .clone()
            .ok_or_else(|| ProviderError::Refused("invalid_grant".to_string()))
    }
}

/// Collection whose every operation fails.
pub struct FailingCollection;

#[async_trait]
impl DocumentCollection for FailingCollection {
    async fn find_one(&self) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn replace_one(&self, _doc: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete_many(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// A body that passes validation.
pub fn valid_content() -> Value {
    json!({
        "name": "Ada Lovelace",
        "title": "Engineer",
        "description": "Writes programs for engines.",
        "skills": ["Rust", "Mathematics"],
        "socialMedia": [{"platform": "GitHub", "url": "https://github.com/ada"}],
        "projects": [{
            "name": "Notes",
            "description": "Notes on the Analytical Engine",
            "technologies": ["Paper"],
            "link": "https://example.com/notes"
        }]
    })
}

/// Value of cookie `name` set by `response`, if any.
pub fn set_cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
