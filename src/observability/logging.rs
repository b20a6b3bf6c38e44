//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing with an `EnvFilter`
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when neither `RUST_LOG` nor the config names a level.
fn default_directive(level: &str) -> String {
    format!("portfolio_server={level},tower_http={level}")
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_covers_crate_and_tower_http() {
        assert_eq!(
            default_directive("debug"),
            "portfolio_server=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging("info");
        init_logging("warn");
    }
}
