//! Logging setup for the `uibind` binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `uibind=debug`.
pub const LOG_ENV: &str = "UIBIND_LOG";

/// Pick the filter directive: `UIBIND_LOG`, then `--verbose`, then the config default.
pub fn filter_directive(verbose: bool, configured: &str) -> String {
    select_directive(std::env::var(LOG_ENV).ok(), verbose, configured)
}

fn select_directive(from_env: Option<String>, verbose: bool, configured: &str) -> String {
    match from_env {
        Some(value) if !value.trim().is_empty() => value,
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Install a stderr fmt subscriber. Safe to call more than once.
pub fn init_tracing(verbose: bool, configured: &str) {
    let directive = filter_directive(verbose, configured);
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
