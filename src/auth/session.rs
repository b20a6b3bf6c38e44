//! Signed session tokens.
//!
//! # Responsibilities
//! - Issue HS256 tokens for a signed-in identity
//! - Verify tokens presented as a cookie or a bearer header
//! - Build the Set-Cookie values for sign-in and sign-out
//!
//! # Design Decisions
//! - The allowlist decision is taken once at sign-in and carried in the token
//! - Tokens are stateless; signing out only removes the cookie
//! - The signing secret is fixed for the process lifetime

use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "portfolio_session";

/// Issuer claim written into every token.
const ISSUER: &str = "portfolio-server";

/// Who is signed in, and whether they were allowlisted when the session was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(rename = "isAllowed")]
    pub allowed_at_issue_time: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    iss: String,
    jti: String,
    sub: String,
    email: String,
    is_allowed: bool,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Keys from a random secret. Sessions do not survive a restart.
    pub fn ephemeral(ttl: Duration) -> Self {
        let secret: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        Self::new(secret.as_bytes(), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, SessionError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<String, SessionError> {
        let claims = SessionClaims {
            iss: ISSUER.to_string(),
            jti: Uuid::new_v4().to_string(),
            sub: identity.id.clone(),
            email: identity.email.clone(),
            is_allowed: identity.allowed_at_issue_time,
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        Ok(Identity {
            id: data.claims.sub,
            email: data.claims.email,
            allowed_at_issue_time: data.claims.is_allowed,
        })
    }

    /// The identity behind the request's session, if it carries a valid one.
    pub fn identity_from_headers(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = session_token(headers)?;
        match self.verify(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session token");
                None
            }
        }
    }
}

/// The session cookie, falling back to an `Authorization: Bearer` header.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE).or_else(|| bearer_token(headers))
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Value of cookie `name` across all Cookie headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Set-Cookie value for an HttpOnly cookie scoped to `path`.
pub fn set_cookie(name: &str, value: &str, path: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={value}; Path={path}; Max-Age={}; HttpOnly; SameSite=Lax",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Set-Cookie value that removes cookie `name`.
pub fn expire_cookie(name: &str, path: &str, secure: bool) -> String {
    set_cookie(name, "", path, Duration::ZERO, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn keys() -> SessionKeys {
        SessionKeys::new(SECRET, Duration::from_secs(24 * 60 * 60))
    }

    fn identity() -> Identity {
        Identity {
            id: "google-123".into(),
            email: "a@x.com".into(),
            allowed_at_issue_time: true,
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let keys = keys();
        let token = keys.issue(&identity()).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), identity());
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let keys = keys();
        let now = Utc::now().timestamp();
        assert_ne!(
            keys.issue_at(&identity(), now).unwrap(),
            keys.issue_at(&identity(), now).unwrap()
        );
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = keys().issue(&identity()).unwrap();
        let other = SessionKeys::new(b"ffffffffffffffffffffffffffffffff", Duration::from_secs(60));
        assert!(other.verify(&token).is_err());
        assert!(SessionKeys::ephemeral(Duration::from_secs(60)).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys();
        let two_days_ago = Utc::now().timestamp() - 2 * 24 * 60 * 60;
        let token = keys.issue_at(&identity(), two_days_ago).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let keys = keys();
        let mut token = keys.issue(&identity()).unwrap();
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&headers), Some("from-header"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; portfolio_session=from-cookie"),
        );
        assert_eq!(session_token(&headers), Some("from-cookie"));
    }

    #[test]
    fn test_identity_from_headers_ignores_garbage() {
        let keys = keys();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("portfolio_session=garbage"));
        assert!(keys.identity_from_headers(&headers).is_none());

        let token = keys.issue(&identity()).unwrap();
        let cookie = format!("{SESSION_COOKIE}={token}");
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        assert_eq!(keys.identity_from_headers(&headers), Some(identity()));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = set_cookie("n", "v", "/", Duration::from_secs(60), true);
        assert_eq!(cookie, "n=v; Path=/; Max-Age=60; HttpOnly; SameSite=Lax; Secure");
        assert_eq!(
            expire_cookie("n", "/auth", false),
            "n=; Path=/auth; Max-Age=0; HttpOnly; SameSite=Lax"
        );
    }
}
