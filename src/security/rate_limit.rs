//! Fixed-window rate limiting keyed by client.

use dashmap::DashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{RateLimitConfig, RateLimitPolicy};
use crate::http::error::ApiError;
use crate::observability::metrics;

/// Bucket shared by every request whose client cannot be identified.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Request count for one client in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    /// End of the window, epoch milliseconds.
    pub reset_time: u64,
}

/// Result of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: u64,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now: u64) -> u64 {
        self.reset_time.saturating_sub(now).div_ceil(1000)
    }
}

/// Per-client fixed-window counters for one policy.
///
/// The count for a key is incremented and compared while the map shard for
/// that key is locked, so concurrent requests from one client are never
/// undercounted.
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request from `key` against `policy`.
    pub fn check(&self, key: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        self.check_at(key, policy, now_millis())
    }

    /// [`RateLimiter::check`] with an explicit clock.
    pub fn check_at(&self, key: &str, policy: &RateLimitPolicy, now: u64) -> RateLimitDecision {
        // Expired windows are swept on every call to bound memory.
        self.entries.retain(|_, entry| entry.reset_time > now);

        let key = if key.is_empty() { UNKNOWN_CLIENT } else { key };
        let fresh = RateLimitEntry {
            count: 0,
            reset_time: now.saturating_add(policy.window_ms()),
        };

        let mut entry = self.entries.entry(key.to_string()).or_insert(fresh);
        if now >= entry.reset_time {
            *entry = fresh;
        }
        entry.count = entry.count.saturating_add(1);

        let limit = policy.max_requests;
        if entry.count > limit {
            RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_time: entry.reset_time,
            }
        } else {
            RateLimitDecision {
                allowed: true,
                limit,
                remaining: limit - entry.count,
                reset_time: entry.reset_time,
            }
        }
    }

    /// Number of clients with an open window.
    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }
}

/// Which named policy a request falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Api,
    Write,
    /// Sign-in attempts. Only `/auth/signin` is charged, so the policy's
    /// `max_requests` is the number of attempts per window.
    Auth,
}

impl LimitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKind::Api => "api",
            LimitKind::Write => "write",
            LimitKind::Auth => "auth",
        }
    }
}

/// One limiter per named policy. Policies are read from the live config on
/// every check so a reload takes effect for new windows.
#[derive(Debug, Default)]
pub struct RateLimiters {
    api: RateLimiter,
    write: RateLimiter,
    auth: RateLimiter,
}

impl RateLimiters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limiter(&self, kind: LimitKind) -> &RateLimiter {
        match kind {
            LimitKind::Api => &self.api,
            LimitKind::Write => &self.write,
            LimitKind::Auth => &self.auth,
        }
    }

    /// Count a request and turn a rejection into [`ApiError::RateLimited`].
    pub fn enforce(
        &self,
        kind: LimitKind,
        client: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitDecision, ApiError> {
        let policy = match kind {
            LimitKind::Api => &config.api,
            LimitKind::Write => &config.write,
            LimitKind::Auth => &config.auth,
        };

        if !config.enabled {
            return Ok(RateLimitDecision {
                allowed: true,
                limit: policy.max_requests,
                remaining: policy.max_requests,
                reset_time: 0,
            });
        }

        let now = now_millis();
        let decision = self.limiter(kind).check_at(client, policy, now);
        if decision.allowed {
            return Ok(decision);
        }

        let retry_after_secs = decision.retry_after_secs(now);
        tracing::warn!(client = %client, policy = kind.as_str(), retry_after_secs, "Rate limit exceeded");
        metrics::record_rate_limited(kind.as_str());
        Err(ApiError::RateLimited { retry_after_secs })
    }
}
