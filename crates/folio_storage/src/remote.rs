//! Remote durable tier.
//!
//! Remote objects live in a private bucket behind a [`RemoteObjectGateway`].
//! A remote descriptor's handle is the object key, never a fetchable URL;
//! display URLs are minted on demand by the access gateway.

use crate::BlobTier;
use chrono::{DateTime, Utc};
use folio_core::{FileDescriptor, StorageTier, mime_type_for_name, safe_file_name};
use folio_error::{FolioResult, StorageError, StorageErrorKind};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// What a signed URL will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum UrlPurpose {
    /// Time-limited read access
    #[display("get")]
    Get,
    /// Time-limited direct upload
    #[display("put")]
    Put,
}

/// Reference returned after storing an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Bucket key of the stored object
    pub key: String,
}

/// Entry in a remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectInfo {
    /// Bucket key
    pub key: String,
    /// Object size in bytes
    pub size: u64,
    /// Last modification time reported by the remote
    pub last_modified: DateTime<Utc>,
}

/// Server-side gateway to the private object bucket.
///
/// Implementations hold the credentials; callers never see them.
#[async_trait::async_trait]
pub trait RemoteObjectGateway: Send + Sync {
    /// Store an object under `key`.
    async fn put_object(
        &self,
        bytes: &[u8],
        key: &str,
        content_type: &str,
    ) -> FolioResult<RemoteObject>;

    /// Mint a signed URL for `key` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayErrorKind::AccessDenied` when the remote refuses.
    async fn get_signed_url(&self, key: &str, purpose: UrlPurpose, ttl: Duration)
    -> FolioResult<String>;

    /// Delete an object, returning whether it existed.
    async fn delete_object(&self, key: &str) -> FolioResult<bool>;

    /// List every object in the bucket.
    async fn list_objects(&self) -> FolioResult<Vec<RemoteObjectInfo>>;
}

/// Stable descriptor id for a remote object that has no mirror record.
pub fn remote_id_for_key(key: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes())
}

/// Bucket key for a file: `<logical path><unix millis>-<safe name>`.
pub fn object_key_for(descriptor: &FileDescriptor, at: DateTime<Utc>) -> String {
    format!(
        "{}{}-{}",
        descriptor.logical_path,
        at.timestamp_millis(),
        safe_file_name(&descriptor.name)
    )
}

/// Build a descriptor for a remote object seen only in a listing.
pub fn descriptor_from_listing(info: &RemoteObjectInfo) -> FileDescriptor {
    let (logical_path, file_part) = match info.key.rsplit_once('/') {
        Some((dir, file)) => (format!("{}/", dir), file),
        None => (String::new(), info.key.as_str()),
    };
    let name = match file_part.split_once('-') {
        Some((stamp, rest)) if !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()) => {
            rest
        }
        _ => file_part,
    };
    FileDescriptor {
        id: remote_id_for_key(&info.key),
        name: name.to_string(),
        logical_path,
        mime_type: mime_type_for_name(name).to_string(),
        size_bytes: info.size,
        tier: StorageTier::Remote,
        handle: info.key.clone(),
        access_url: None,
        created_at: info.last_modified,
        refreshed_at: info.last_modified,
    }
}

/// Blob tier adapter over a [`RemoteObjectGateway`].
#[derive(Clone)]
pub struct RemoteTier {
    gateway: Arc<dyn RemoteObjectGateway>,
}

impl RemoteTier {
    /// Wrap a gateway.
    pub fn new(gateway: Arc<dyn RemoteObjectGateway>) -> Self {
        Self { gateway }
    }

    /// Underlying gateway.
    pub fn gateway(&self) -> &Arc<dyn RemoteObjectGateway> {
        &self.gateway
    }
}

#[async_trait::async_trait]
impl BlobTier for RemoteTier {
    fn tier(&self) -> StorageTier {
        StorageTier::Remote
    }

    #[tracing::instrument(skip(self, descriptor, bytes), fields(key = %descriptor.handle, size = bytes.len()))]
    async fn write(&self, descriptor: &FileDescriptor, bytes: &[u8]) -> FolioResult<()> {
        if descriptor.handle.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::Remote(format!(
                "no object key assigned to {}",
                descriptor.id
            )))
            .into());
        }
        self.gateway
            .put_object(bytes, &descriptor.handle, &descriptor.mime_type)
            .await?;
        tracing::info!("Stored object in remote tier");
        Ok(())
    }

    async fn read(&self, descriptor: &FileDescriptor) -> FolioResult<Vec<u8>> {
        Err(StorageError::new(StorageErrorKind::Unavailable(format!(
            "remote object {} is only reachable through a signed URL",
            descriptor.handle
        )))
        .into())
    }

    #[tracing::instrument(skip(self, descriptor), fields(key = %descriptor.handle))]
    async fn remove(&self, descriptor: &FileDescriptor) -> FolioResult<bool> {
        self.gateway.delete_object(&descriptor.handle).await
    }

    async fn records(&self) -> FolioResult<Vec<FileDescriptor>> {
        Ok(self
            .gateway
            .list_objects()
            .await?
            .iter()
            .map(descriptor_from_listing)
            .collect())
    }

    async fn clear(&self) -> FolioResult<()> {
        tracing::debug!("Remote tier is never cleared by the store");
        Ok(())
    }
}
