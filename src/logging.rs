//! Structured logging setup using `tracing-subscriber`.
//!
//! Human-readable output on stderr. The repeatable `-v` flag raises the
//! default level; `RUST_LOG` overrides it entirely when set.

use tracing_subscriber::EnvFilter;

/// Initialise logging for the monitor.
///
/// `verbosity` is the count of `-v` flags: 0 → `info`, 1 → `debug`,
/// 2 or more → `trace`.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
