//! Recovery of usable URLs for matched files.

use folio_core::FileDescriptor;
use folio_storage::TieredBlobStore;

/// Source of a second chance when a matched file has no usable URL.
#[async_trait::async_trait]
pub trait HandleRecovery: Send + Sync {
    /// Try to produce a descriptor with a usable URL for `descriptor`.
    ///
    /// The result may be a different record with the same name when the
    /// original id is gone.
    async fn recover(&self, descriptor: &FileDescriptor) -> Option<FileDescriptor>;

    /// Whether `url` still resolves.
    fn is_live(&self, _url: &str) -> bool {
        true
    }
}

#[async_trait::async_trait]
impl HandleRecovery for TieredBlobStore {
    async fn recover(&self, descriptor: &FileDescriptor) -> Option<FileDescriptor> {
        TieredBlobStore::recover(self, descriptor)
            .await
            .filter(|d| d.display_url().is_some())
    }

    fn is_live(&self, url: &str) -> bool {
        TieredBlobStore::is_live(self, url)
    }
}
