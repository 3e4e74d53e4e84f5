//! Logging setup for the CLI.

use anyhow::Result;

/// Initialize the tracing subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `warn`. Logs go to stderr so
/// stdout stays clean for `--json` output.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
