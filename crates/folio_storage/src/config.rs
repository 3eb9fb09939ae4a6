//! Storage configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the tiered blob store.
///
/// ```toml
/// [storage]
/// namespace = "folio"
/// binary_capacity_bytes = 1_073_741_824
/// kv_capacity_bytes = 5_242_880
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct StorageConfig {
    /// Prefix for every key and directory this store owns
    #[serde(default = "default_namespace")]
    namespace: String,

    /// Whether the binary-capable tier is available in this environment
    #[serde(default = "default_binary_enabled")]
    binary_enabled: bool,

    /// Directory for the binary-capable tier (defaults to the system temp dir)
    #[serde(default)]
    #[setters(strip_option)]
    binary_dir: Option<PathBuf>,

    /// Capacity of the binary-capable tier in bytes
    #[serde(default = "default_binary_capacity")]
    binary_capacity_bytes: u64,

    /// Capacity of the string-only tier in bytes (payloads plus metadata)
    #[serde(default = "default_kv_capacity")]
    kv_capacity_bytes: u64,

    /// Largest file accepted by `put`
    #[serde(default = "default_max_file_bytes")]
    max_file_bytes: u64,
}

fn default_namespace() -> String {
    "folio".to_string()
}

fn default_binary_enabled() -> bool {
    true
}

fn default_binary_capacity() -> u64 {
    1024 * 1024 * 1024 // 1 GiB
}

fn default_kv_capacity() -> u64 {
    5 * 1024 * 1024 // 5 MiB
}

fn default_max_file_bytes() -> u64 {
    folio_core::DEFAULT_MAX_FILE_BYTES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            binary_enabled: default_binary_enabled(),
            binary_dir: None,
            binary_capacity_bytes: default_binary_capacity(),
            kv_capacity_bytes: default_kv_capacity(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl StorageConfig {
    /// Directory the binary tier writes into, namespaced.
    pub fn resolved_binary_dir(&self) -> PathBuf {
        self.binary_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("folio-media"))
            .join(&self.namespace)
    }
}
