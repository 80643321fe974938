//! Process-wide logging setup
//!
//! The library logs through `tracing` macros only; the binary installs the
//! subscriber once at startup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the process-wide tracing subscriber.
///
/// Logs go to stderr so `show-config` output on stdout stays clean.
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug`
/// with `verbose`.
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let default_level = if verbose { "debug" } else { "info" };
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
