use crate::config::{LogConfig, LogFormat};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Build the event filter: `RUST_LOG` when set, the configured directives otherwise.
pub fn build_filter(cfg: &LogConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&cfg.filter)
            .with_context(|| format!("invalid log filter '{}'", cfg.filter)),
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries the protocol.
pub fn init(cfg: &LogConfig) -> anyhow::Result<()> {
    let filter = build_filter(cfg)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match cfg.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
