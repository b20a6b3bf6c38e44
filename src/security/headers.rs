//! Security response headers.
//!
//! # Responsibilities
//! - Define the hardening headers sent with every response
//! - Leave a header alone when a handler already set it
//!
//! # Design Decisions
//! - Applied as tower-http layers so handlers never need to remember them

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

/// The hardening headers as static name/value pairs.
pub const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-dns-prefetch-control", "on"),
    ("strict-transport-security", "max-age=63072000; includeSubDomains; preload"),
    ("x-xss-protection", "1; mode=block"),
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "origin-when-cross-origin"),
];

/// Wrap `router` so every response carries [`SECURITY_HEADERS`].
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}
