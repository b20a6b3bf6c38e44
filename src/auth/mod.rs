//! Authentication and authorization subsystem.
//!
//! # Data Flow
//! ```text
//! GET /auth/signin
//!     → oauth.rs (state cookie, redirect to provider)
//! GET /auth/callback
//!     → oauth.rs (state check, code exchange, allowlist decision)
//!     → session.rs (signed token in an HttpOnly cookie)
//!
//! Later requests:
//!     → session.rs (verify token → Identity)
//!     → allowlist.rs (mutations re-check the live list)
//! ```
//!
//! # Design Decisions
//! - Users off the allowlist never receive a session
//! - The admin gate trusts the flag in the token; content writes do not

pub mod allowlist;
pub mod oauth;
pub mod session;

pub use allowlist::Allowlist;
pub use oauth::{GoogleProvider, IdentityProvider, ProviderError, ProviderProfile, SignInError};
pub use session::{Identity, SessionError, SessionKeys, SESSION_COOKIE};

/// Where a request stands with respect to sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Allowed(Identity),
    Denied(Identity),
}

impl SessionState {
    pub fn from_identity(identity: Option<Identity>) -> Self {
        match identity {
            None => SessionState::Unauthenticated,
            Some(identity) if identity.allowed_at_issue_time => SessionState::Allowed(identity),
            Some(identity) => SessionState::Denied(identity),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Allowed(_) => "allowed",
            SessionState::Denied(_) => "denied",
        }
    }
}
