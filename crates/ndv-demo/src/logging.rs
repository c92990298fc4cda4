//! Stderr logging for the demo binary.

use tracing_subscriber::EnvFilter;

/// Level used when the requested filter does not parse.
pub const FALLBACK_FILTER: &str = "warn";

/// Build the filter for `directive`, falling back to [`FALLBACK_FILTER`].
///
/// Returns the filter and, on fallback, the parse error message.
pub fn filter_for(directive: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(FALLBACK_FILTER), Some(err.to_string())),
    }
}

/// Install a global `fmt` subscriber writing to stderr, so stdout carries
/// only the scenario output. A second call is a no-op.
pub fn init(directive: &str) {
    let (filter, rejected) = filter_for(directive);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();
    if let Some(reason) = rejected {
        tracing::warn!(directive, %reason, "invalid log filter, using {FALLBACK_FILTER}");
    }
    tracing::debug!(installed, "logging initialized");
}
