//! File descriptor and storage tier types.

use crate::{naming, MediaType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage substrate that owns the authoritative bytes of a file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum StorageTier {
    /// Binary-capable, session-durable local store with large capacity
    #[display("ephemeral-binary")]
    EphemeralBinary,
    /// String-only local key/value store with small capacity
    #[display("ephemeral-kv")]
    EphemeralKv,
    /// Durable remote object storage reached through pre-signed access
    #[display("remote")]
    Remote,
}

impl StorageTier {
    /// Convert to string representation for metadata storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::EphemeralBinary => "ephemeral-binary",
            StorageTier::EphemeralKv => "ephemeral-kv",
            StorageTier::Remote => "remote",
        }
    }

    /// Whether handles issued for this tier die at a reload boundary.
    pub fn is_ephemeral(&self) -> bool {
        !matches!(self, StorageTier::Remote)
    }
}

impl std::str::FromStr for StorageTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ephemeral-binary" => Ok(StorageTier::EphemeralBinary),
            "ephemeral-kv" => Ok(StorageTier::EphemeralKv),
            "remote" => Ok(StorageTier::Remote),
            _ => Err(format!("Unknown storage tier: {}", s)),
        }
    }
}

/// The logical record identifying an uploaded file.
///
/// `id` is assigned at ingestion and never changes. `handle` is tier specific:
/// for the two ephemeral tiers it is a session-scoped local reference that is
/// rebuilt on every retrieval, for the remote tier it is the bucket key and
/// must be exchanged for a time-limited `access_url` before display.
///
/// # Examples
///
/// ```
/// use folio_core::{FileDescriptor, StorageTier};
///
/// let descriptor = FileDescriptor::new("logo.png", "contents/images/2024/05/01/", 2048, StorageTier::EphemeralBinary);
/// assert_eq!(descriptor.mime_type, "image/png");
/// assert!(descriptor.display_url().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Unique identifier, stable for the file's lifetime
    pub id: Uuid,
    /// Original human-given filename (not guaranteed unique)
    pub name: String,
    /// Classification path used for organization, not identity
    pub logical_path: String,
    /// MIME type
    pub mime_type: String,
    /// Size of the payload in bytes
    pub size_bytes: u64,
    /// Tier holding the authoritative bytes
    pub tier: StorageTier,
    /// Tier-specific access string
    #[serde(default)]
    pub handle: String,
    /// Time-limited URL minted for remote-tier descriptors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    /// When the file was ingested
    pub created_at: DateTime<Utc>,
    /// Last time a local handle was regenerated
    pub refreshed_at: DateTime<Utc>,
}

impl FileDescriptor {
    /// Create a descriptor for a freshly ingested file with no handle yet.
    pub fn new(
        name: impl Into<String>,
        logical_path: impl Into<String>,
        size_bytes: u64,
        tier: StorageTier,
    ) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mime_type: naming::mime_type_for_name(&name).to_string(),
            name,
            logical_path: logical_path.into(),
            size_bytes,
            tier,
            handle: String::new(),
            access_url: None,
            created_at: now,
            refreshed_at: now,
        }
    }

    /// Media type derived from the MIME type, falling back to the file extension.
    pub fn media_type(&self) -> MediaType {
        MediaType::from_mime(&self.mime_type)
            .or_else(|| MediaType::from_extension(naming::extension_of(&self.name)))
            .unwrap_or(MediaType::Document)
    }

    /// URL a renderer can embed, if any.
    ///
    /// Remote handles are bucket keys and never directly fetchable, so remote
    /// descriptors only yield their minted `access_url`.
    pub fn display_url(&self) -> Option<&str> {
        let url = match self.tier {
            StorageTier::Remote => self.access_url.as_deref()?,
            _ => self.handle.as_str(),
        };
        let url = url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Copy of this descriptor suitable for persisting in a metadata mirror.
    ///
    /// Ephemeral handles and access URLs are session artifacts and are stripped.
    pub fn to_mirror_record(&self) -> Self {
        let mut record = self.clone();
        if self.tier.is_ephemeral() {
            record.handle.clear();
        }
        record.access_url = None;
        record
    }
}
