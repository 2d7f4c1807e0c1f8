use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber for programs using cfgsync.
///
/// The level comes from `RUST_LOG`, falling back to `default_level` (for
/// example `"info"` or `"cfgsync_core=debug"`). Fails if a subscriber is
/// already installed.
pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
