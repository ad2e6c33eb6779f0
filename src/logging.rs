//! Diagnostic logging.
//!
//! User-facing output goes through the `info!`, `success!`, `warning!` and
//! `error!` macros. Library internals (retries, refreshes, page walks) emit
//! `tracing` events which stay silent unless `RUST_LOG` asks for them, e.g.
//! `RUST_LOG=sporlist=debug`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "sporlist=warn";

/// Installs a stderr `fmt` subscriber. Calling it twice is harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
