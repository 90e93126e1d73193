pub mod cli;
pub mod config;
pub mod logging;
pub mod seed;
pub mod service;

pub use cli::Cli;
pub use config::{LogConfig, LogFormat, ServerConfig};
pub use service::{ErrorBody, RequestEnvelope, ResponseEnvelope, SetService};

use gnmi_set_core::{InMemoryCache, SchemaValidator, SetHandler};
use std::sync::Arc;

/// Build the service for `cfg`, seeding the cache when a seed file is configured.
pub fn build_service(cfg: &ServerConfig) -> anyhow::Result<(SetService, Arc<InMemoryCache>)> {
    let cache = Arc::new(InMemoryCache::new());
    if let Some(path) = &cfg.seed {
        let n = seed::load_into(&cache, path)?;
        tracing::info!(entries = n, seed = %path.display(), "cache seeded");
    }
    let handler = SetHandler::new(
        cache.clone(),
        Arc::new(SchemaValidator::new()),
        cfg.handler.clone(),
    );
    Ok((SetService::new(handler), cache))
}
