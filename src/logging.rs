//! Console logging setup using `tracing-subscriber`.
//!
//! Library consumers install their own subscriber; only the CLI binary
//! calls [`init_cli`].

use tracing_subscriber::EnvFilter;

/// Initialise human-readable logging on stderr for CLI runs.
///
/// Controlled by `RUST_LOG` (default: `info`).
pub fn init_cli() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
