//! Request extractors.
//!
//! # Responsibilities
//! - Derive the rate-limit key of the calling client
//! - Resolve the session identity, if any
//! - Read the request ID assigned by the server layers

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::auth::Identity;
use crate::http::state::AppState;
use crate::security::client_key;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID, or `"unknown"` outside the server layers.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Rate-limit key of the calling client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let trust_forwarded = state.config().security.trust_forwarded_headers;
        Ok(ClientKey(client_key(&parts.headers, peer, trust_forwarded)))
    }
}

/// The verified session identity. Missing or invalid tokens yield `None`.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Identity>);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(state.sessions.identity_from_headers(&parts.headers)))
    }
}
