//! Sign-in through an OAuth identity provider.
//!
//! The provider proves who the user is; the allowlist decides whether a
//! session is issued at all. A rejected sign-in never produces a token.

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::auth::allowlist::Allowlist;
use crate::auth::session::Identity;
use crate::config::GoogleOAuthConfig;

/// Cookie holding the CSRF state for an in-flight sign-in.
pub const STATE_COOKIE: &str = "portfolio_oauth_state";

/// How long a sign-in may take between redirect and callback.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on each request to the provider.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Path the provider redirects back to.
pub const CALLBACK_PATH: &str = "/auth/callback";

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// What the provider tells us about the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderProfile {
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider refused the request: {0}")]
    Refused(String),

    #[error("identity provider is not configured")]
    NotConfigured,
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("sign-in state does not match")]
    StateMismatch,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("identity provider returned no usable email")]
    MissingEmail,

    #[error("identity provider has not verified the email")]
    Unverified,

    #[error("identity provider denied the sign-in: {0}")]
    ProviderDenied(String),

    #[error("callback carried no authorization code")]
    MissingCode,

    #[error("{0} is not on the allowlist")]
    Rejected(String),
}

impl SignInError {
    /// Label for the `portfolio_sign_in_total` outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            SignInError::StateMismatch => "state_mismatch",
            SignInError::Provider(_) => "provider_error",
            SignInError::MissingEmail => "missing_email",
            SignInError::Unverified => "unverified",
            SignInError::ProviderDenied(_) => "provider_denied",
            SignInError::MissingCode => "missing_code",
            SignInError::Rejected(_) => "rejected",
        }
    }
}

/// An OAuth authorization-code provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;

    /// Where to send the browser to start a sign-in.
    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<Url, ProviderError>;

    /// Trade an authorization code for the user's profile.
    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<ProviderProfile, ProviderError>;
}

/// Google as the identity provider.
pub struct GoogleProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleProvider {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        let client = match reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to an HTTP client without a request timeout");
                reqwest::Client::new()
            }
        };
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<Url, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured);
        }
        Url::parse_with_params(
            GOOGLE_AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| ProviderError::Refused(e.to_string()))
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<ProviderProfile, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured);
        }

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Refused(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;

        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Refused(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

/// Decide whether a provider profile gets a session.
pub fn sign_in(profile: ProviderProfile, allowlist: &Allowlist) -> Result<Identity, SignInError> {
    let email = profile
        .email
        .filter(|e| !e.is_empty())
        .ok_or(SignInError::MissingEmail)?;
    if profile.email_verified == Some(false) {
        return Err(SignInError::Unverified);
    }
    if !allowlist.contains(&email) {
        return Err(SignInError::Rejected(email));
    }
    Ok(Identity {
        id: profile.subject,
        email,
        allowed_at_issue_time: true,
    })
}

/// Random value tying a callback to the browser that started the sign-in.
pub fn new_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Check the callback's `state` against the cookie set when sign-in started.
pub fn verify_state(expected: Option<&str>, received: Option<&str>) -> Result<(), SignInError> {
    match (expected, received) {
        (Some(expected), Some(received)) if !expected.is_empty() && expected == received => Ok(()),
        _ => Err(SignInError::StateMismatch),
    }
}

/// Absolute callback URL under the site's public URL.
pub fn callback_url(public_url: &str) -> String {
    format!("{}{CALLBACK_PATH}", public_url.trim_end_matches('/'))
}
