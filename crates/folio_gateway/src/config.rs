//! Gateway configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batching and URL lifetime settings for the secure access gateway.
///
/// ```toml
/// [gateway]
/// batch_size = 5
/// batch_pause_ms = 100
/// display_url_ttl_secs = 86400
/// upload_url_ttl_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct GatewayConfig {
    /// Descriptors signed concurrently per batch
    #[serde(default = "default_batch_size")]
    batch_size: usize,

    /// Pause between batches in milliseconds
    #[serde(default = "default_batch_pause_ms")]
    batch_pause_ms: u64,

    /// Lifetime of display URLs in seconds
    #[serde(default = "default_display_ttl")]
    display_url_ttl_secs: u64,

    /// Lifetime of upload URLs in seconds
    #[serde(default = "default_upload_ttl")]
    upload_url_ttl_secs: u64,
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_pause_ms() -> u64 {
    100
}

fn default_display_ttl() -> u64 {
    24 * 60 * 60
}

fn default_upload_ttl() -> u64 {
    5 * 60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            display_url_ttl_secs: default_display_ttl(),
            upload_url_ttl_secs: default_upload_ttl(),
        }
    }
}

impl GatewayConfig {
    /// Pause between batches.
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    /// Display URL lifetime.
    pub fn display_ttl(&self) -> Duration {
        Duration::from_secs(self.display_url_ttl_secs)
    }

    /// Upload URL lifetime.
    pub fn upload_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_secs)
    }
}
