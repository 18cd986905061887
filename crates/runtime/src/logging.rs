//! Tracing subscriber setup
//!
//! Logs go to stderr so program output on stdout stays clean.

use crate::config::DEFAULT_LOG_FILTER;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Later calls are no-ops.
pub fn init(directive: &str) {
    let filter = match EnvFilter::try_new(directive) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!(
                "Warning: invalid log filter '{}' ({}), using '{}'",
                directive, e, DEFAULT_LOG_FILTER
            );
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
