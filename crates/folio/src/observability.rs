//! Log subscriber setup.

use derive_getters::Getters;
use folio_error::{ConfigError, ConfigErrorKind, FolioResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct ObservabilityConfig {
    /// Service name attached to every event
    #[serde(default = "default_service_name")]
    service_name: String,

    /// Log level filter (e.g., "info", "folio_storage=debug")
    #[serde(default = "default_log_level")]
    log_level: String,

    /// Enable JSON-formatted logs for structured logging
    #[serde(default)]
    json_logs: bool,
}

fn default_service_name() -> String {
    "folio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Install the global log subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Fails if the level filter is malformed or a subscriber is already installed.
pub fn init_observability(config: &ObservabilityConfig) -> FolioResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))?;

    tracing::info!(service = %config.service_name, "Logging initialized");
    Ok(())
}
