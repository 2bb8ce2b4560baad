use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the process-wide tracing subscriber.
///
/// `level` is the default directive; `RUST_LOG` overrides it when set.
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
