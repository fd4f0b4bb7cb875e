//! Process-wide tracing setup.
//!
//! Logs go to stderr so `--json` output on stdout stays machine-readable.
//! `FLOWSTATE_LOG` (any `EnvFilter` directive) overrides the configured level.

use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

pub const LOG_ENV: &str = "FLOWSTATE_LOG";

/// Build the filter: env override first, then `default_level`, then `warn`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_ENV)
        && let Ok(filter) = EnvFilter::try_new(&directive)
    {
        return filter;
    }
    EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Safe to call more than once; only the
/// first call takes effect.
pub fn init_logging(default_level: &str) {
    let _ = registry()
        .with(build_filter(default_level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
