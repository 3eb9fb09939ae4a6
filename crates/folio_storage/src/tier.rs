//! Blob tier contract shared by every storage adapter.

use folio_core::{FileDescriptor, StorageTier};
use folio_error::FolioResult;
use uuid::Uuid;

/// Trait implemented by the three tier adapters.
///
/// A tier stores raw bytes for a descriptor. Which tier is authoritative for a
/// descriptor is decided by the [`TieredBlobStore`](crate::TieredBlobStore);
/// adapters only move bytes.
#[async_trait::async_trait]
pub trait BlobTier: Send + Sync {
    /// Which tier this adapter implements.
    fn tier(&self) -> StorageTier;

    /// Store `bytes` for `descriptor`.
    ///
    /// # Errors
    ///
    /// Capacity problems and unsupported environments must surface as
    /// `StorageErrorKind::TierRejected` so the store can fall back.
    async fn write(&self, descriptor: &FileDescriptor, bytes: &[u8]) -> FolioResult<()>;

    /// Read the bytes stored for `descriptor`.
    async fn read(&self, descriptor: &FileDescriptor) -> FolioResult<Vec<u8>>;

    /// Delete the bytes stored for `descriptor`, returning whether anything was removed.
    async fn remove(&self, descriptor: &FileDescriptor) -> FolioResult<bool>;

    /// Descriptors this tier can vouch for on its own.
    async fn records(&self) -> FolioResult<Vec<FileDescriptor>>;

    /// Find a single record by id.
    async fn record(&self, id: Uuid) -> FolioResult<Option<FileDescriptor>> {
        Ok(self.records().await?.into_iter().find(|r| r.id == id))
    }

    /// Delete everything this tier holds under the store's namespace.
    async fn clear(&self) -> FolioResult<()>;
}
