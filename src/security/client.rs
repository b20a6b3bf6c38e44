//! Client identification for rate limiting.
//!
//! # Design Decisions
//! - The peer address is authoritative by default
//! - X-Forwarded-For / X-Real-IP are honoured only when configured, since any
//!   client can send them
//! - No identifiable client falls back to the shared "unknown" bucket

use axum::http::HeaderMap;
use std::net::SocketAddr;

use crate::security::rate_limit::UNKNOWN_CLIENT;

/// Derive the rate-limit key for a request.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded.or(real_ip) {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
