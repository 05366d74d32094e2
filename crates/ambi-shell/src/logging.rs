#![forbid(unsafe_code)]

//! Log subscriber setup.
//!
//! Logs go to stderr so they never interleave with the prompt on stdout.
//! The filter comes from `AMBI_LOG` in `EnvFilter` syntax, e.g.
//! `AMBI_LOG=ambi_runtime=debug`.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "AMBI_LOG";

/// Filter used when `AMBI_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Build the filter for an `AMBI_LOG` value.
///
/// An unset, empty or unparsable value falls back to [`DEFAULT_DIRECTIVE`].
#[must_use]
pub fn filter(value: Option<&str>) -> EnvFilter {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Later calls do nothing.
pub fn init() {
    let value = std::env::var(LOG_ENV).ok();
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(value.as_deref()))
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init();
    if installed.is_ok() {
        tracing::debug!(filter = ?value, "logging initialized");
    }
}
