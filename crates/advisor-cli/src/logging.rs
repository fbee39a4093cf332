//! Logging configuration for the advisor

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use advisor_core::{Error, Result};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn,advisor=info" }
}

/// Install a stderr subscriber; `RUST_LOG` overrides the default filter
pub fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let console_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .map_err(|e| Error::Configuration(format!("failed to initialize logging: {}", e)))?;

    tracing::debug!(verbose, "Logging initialized");
    Ok(())
}
