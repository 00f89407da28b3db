//! Logging setup for Switchboard
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a
//! text or JSON fmt layer. Library crates only emit `tracing` events;
//! binaries call [`init`] once at startup.

use switchboard_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global subscriber
///
/// The filter is taken from `RUST_LOG` when set, then from the config,
/// then from `default_filter`. Logs go to stderr so streamed completions
/// on stdout stay clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>, default_filter: &str) -> anyhow::Result<()> {
    let directive = config
        .and_then(|c| c.log_filter.as_deref())
        .unwrap_or(default_filter);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = config.map(|c| c.format).unwrap_or_default();
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
