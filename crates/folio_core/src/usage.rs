//! Storage usage snapshots.

use crate::{FileDescriptor, StorageTier};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Usage entry for a single stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct FileUsage {
    /// Descriptor id
    id: Uuid,
    /// Original filename
    name: String,
    /// Size in bytes
    size_bytes: u64,
    /// Tier holding the bytes
    tier: StorageTier,
    /// MIME type
    mime_type: String,
    /// Ingestion time
    created_at: DateTime<Utc>,
}

impl From<&FileDescriptor> for FileUsage {
    fn from(descriptor: &FileDescriptor) -> Self {
        Self {
            id: descriptor.id,
            name: descriptor.name.clone(),
            size_bytes: descriptor.size_bytes,
            tier: descriptor.tier,
            mime_type: descriptor.mime_type.clone(),
            created_at: descriptor.created_at,
        }
    }
}

/// Snapshot of everything the store currently holds.
///
/// Attached to capacity errors so a caller can offer cleanup instead of
/// failing silently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Sum of all file sizes
    total_bytes: u64,
    /// Number of files
    total_count: usize,
    /// Per-file breakdown, oldest first
    per_file: Vec<FileUsage>,
    /// Bytes currently used in the string-only tier (payloads plus metadata)
    kv_bytes_used: u64,
    /// Capacity of the string-only tier
    kv_capacity_bytes: u64,
}

impl UsageReport {
    /// Build a report from descriptors and the string-only tier's accounting.
    pub fn new<'a>(
        descriptors: impl IntoIterator<Item = &'a FileDescriptor>,
        kv_bytes_used: u64,
        kv_capacity_bytes: u64,
    ) -> Self {
        let mut per_file: Vec<FileUsage> = descriptors.into_iter().map(FileUsage::from).collect();
        per_file.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Self {
            total_bytes: per_file.iter().map(|f| f.size_bytes).sum(),
            total_count: per_file.len(),
            per_file,
            kv_bytes_used,
            kv_capacity_bytes,
        }
    }

    /// Total bytes held by a single tier.
    pub fn bytes_in(&self, tier: StorageTier) -> u64 {
        self.per_file
            .iter()
            .filter(|f| f.tier == tier)
            .map(|f| f.size_bytes)
            .sum()
    }
}

impl std::fmt::Display for UsageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} in {} files (key/value tier {} of {})",
            format_file_size(self.total_bytes),
            self.total_count,
            format_file_size(self.kv_bytes_used),
            format_file_size(self.kv_capacity_bytes)
        )
    }
}

/// Format a byte count for humans, using 1024-based units and at most two decimals.
///
/// ```
/// use folio_core::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{} {}", text, UNITS[unit])
}
