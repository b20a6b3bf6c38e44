//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client.rs (derive the client key)
//!     → rate_limit.rs (count against the api / write / auth policy)
//!     → [handlers: session, allowlist, validation]
//! Outgoing response:
//!     → headers.rs (hardening headers)
//! ```
//!
//! # Design Decisions
//! - Limiter state is owned by the server state, never global
//! - Rate limiting runs before any authentication work
//! - No trust in client input

pub mod client;
pub mod headers;
pub mod rate_limit;

pub use client::client_key;
pub use rate_limit::{LimitKind, RateLimitDecision, RateLimiter, RateLimiters};
