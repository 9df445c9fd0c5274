//! Logging setup and startup reporting

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CatalogError, Result};
use crate::registry::RegistryStats;
use std::path::Path;
use tracing::{info, warn, Dispatch};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Build a dispatch writing to stderr in the configured format
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn build_dispatch(config: &LoggingConfig) -> Dispatch {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (text, json) = match config.format {
        LogFormat::Text => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    let subscriber = tracing_subscriber::registry().with(text).with(json).with(env_filter);
    Dispatch::new(subscriber)
}

/// Install the configured dispatch as the global default
pub fn init_logging(config: &LoggingConfig) -> Result<Dispatch> {
    let dispatch = build_dispatch(config);
    tracing::dispatcher::set_global_default(dispatch.clone())
        .map_err(|e| CatalogError::config(format!("Failed to install logger: {}", e)))?;
    Ok(dispatch)
}

/// Startup summary for the catalogue
pub struct StartupLogger;

impl StartupLogger {
    /// Log where configuration came from and what was registered
    pub fn display_startup_info(config_path: Option<&Path>, stats: &RegistryStats, version: &str) {
        info!("toolcatalog v{} starting", version);

        match config_path {
            Some(path) if path.exists() => info!("Config file: {}", path.display()),
            Some(path) => warn!("Config file {} not found, using defaults", path.display()),
            None => info!("Config file: built-in defaults"),
        }

        if stats.tool_count == 0 {
            warn!("Capability registry is empty");
        } else {
            info!(
                "Capability registry: {} tools in {} categories",
                stats.tool_count, stats.category_count
            );
            for (category, count) in &stats.per_category {
                info!("   {}: {}", category.display_name(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_dispatch_for_each_format() {
        for format in [LogFormat::Text, LogFormat::Json] {
            let dispatch = build_dispatch(&LoggingConfig {
                level: "debug".to_string(),
                format,
            });
            tracing::dispatcher::with_default(&dispatch, || {
                tracing::debug!(format = ?format, "dispatch built");
            });
        }
    }
}
