//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`folio.toml` shipped with this crate)
//! 2. `~/.config/folio/folio.toml`
//! 3. `./folio.toml`

use crate::ObservabilityConfig;
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use folio_error::{ConfigError, ConfigErrorKind, FolioResult};
use folio_gateway::GatewayConfig;
use folio_storage::StorageConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../folio.toml");

/// Top-level Folio configuration.
///
/// # Example
///
/// ```no_run
/// use folio::FolioConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FolioConfig::load()?;
/// println!("batch size: {}", config.gateway().batch_size());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct FolioConfig {
    /// Tiered blob store settings
    #[serde(default)]
    storage: StorageConfig,

    /// Secure access gateway settings
    #[serde(default)]
    gateway: GatewayConfig,

    /// Logging settings
    #[serde(default)]
    observability: ObservabilityConfig,
}

impl FolioConfig {
    /// Load configuration from a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> FolioResult<Self> {
        debug!("Loading configuration from file");
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Read(format!(
                    "{}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?;
        Self::finish(config)
    }

    /// Parse configuration from TOML text, over the bundled defaults.
    pub fn from_toml(toml: &str) -> FolioResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Read(e.to_string())))?;
        Self::finish(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if absent.
    #[instrument]
    pub fn load() -> FolioResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/folio/folio.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("folio").required(false));

        let config = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Read(e.to_string())))?;
        Self::finish(config)
    }

    fn finish(config: Config) -> FolioResult<Self> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values that would stall the store or the gateway.
    pub fn validate(&self) -> FolioResult<()> {
        if *self.gateway.batch_size() == 0 {
            return Err(
                ConfigError::new(ConfigErrorKind::Invalid("gateway.batch_size = 0".into())).into(),
            );
        }
        if self.storage.namespace().trim().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::Invalid(
                "storage.namespace is empty".into(),
            ))
            .into());
        }
        if *self.storage.kv_capacity_bytes() == 0 {
            return Err(ConfigError::new(ConfigErrorKind::Invalid(
                "storage.kv_capacity_bytes = 0".into(),
            ))
            .into());
        }
        Ok(())
    }
}
