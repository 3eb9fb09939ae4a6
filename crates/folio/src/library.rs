//! Store, gateway and resolver wired together.

use crate::FolioConfig;
use chrono::Utc;
use folio_core::{FileDescriptor, LogicalPath, StorageTier};
use folio_error::FolioResult;
use folio_gateway::SecureAccessGateway;
use folio_resolver::{HandleRecovery, MediaResolver, ResolvedContent};
use folio_storage::{RemoteObjectGateway, TieredBlobStore};
use std::sync::Arc;

/// Recovery that also knows how to mint URLs for remote records.
struct LibraryRecovery {
    store: Arc<TieredBlobStore>,
    gateway: Option<SecureAccessGateway>,
}

#[async_trait::async_trait]
impl HandleRecovery for LibraryRecovery {
    async fn recover(&self, descriptor: &FileDescriptor) -> Option<FileDescriptor> {
        let mut record = self.store.recover(descriptor).await?;
        match (record.tier, &self.gateway) {
            (StorageTier::Remote, Some(gateway)) => match gateway.display_url(&record.handle).await {
                Ok(url) => {
                    record.access_url = Some(url);
                    Some(record)
                }
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Recovery could not mint access URL");
                    None
                }
            },
            (StorageTier::Remote, None) => None,
            _ => record.display_url().is_some().then_some(record),
        }
    }

    fn is_live(&self, url: &str) -> bool {
        self.store.is_live(url)
    }
}

/// Entry point for uploading media and rendering content that references it.
///
/// # Example
///
/// ```no_run
/// use folio::{FolioConfig, MediaLibrary};
///
/// # async fn example() -> folio::FolioResult<()> {
/// let library = MediaLibrary::new(&FolioConfig::load()?)?;
/// library.upload(b"...".to_vec(), "logo.png").await?;
/// let html = library.render("Our logo: [image:logo.png]").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    store: Arc<TieredBlobStore>,
    gateway: Option<SecureAccessGateway>,
    resolver: MediaResolver,
}

impl MediaLibrary {
    /// Library with ephemeral tiers only.
    pub fn new(config: &FolioConfig) -> FolioResult<Self> {
        let store = Arc::new(TieredBlobStore::from_config(config.storage().clone()));
        Self::assemble(config, store)
    }

    /// Library backed by a remote object gateway as well.
    pub fn with_remote(
        config: &FolioConfig,
        remote: Arc<dyn RemoteObjectGateway>,
    ) -> FolioResult<Self> {
        let store = Arc::new(
            TieredBlobStore::from_config(config.storage().clone()).with_remote(remote),
        );
        Self::assemble(config, store)
    }

    /// Library over an already-built store.
    ///
    /// The access gateway is enabled when the store has a remote tier.
    pub fn assemble(config: &FolioConfig, store: Arc<TieredBlobStore>) -> FolioResult<Self> {
        let gateway = store
            .remote_gateway()
            .map(|remote| SecureAccessGateway::new(Arc::clone(remote), config.gateway().clone()));
        let recovery = LibraryRecovery {
            store: Arc::clone(&store),
            gateway: gateway.clone(),
        };
        let resolver = MediaResolver::new()?.with_recovery(Arc::new(recovery));
        Ok(Self {
            store,
            gateway,
            resolver,
        })
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<TieredBlobStore> {
        &self.store
    }

    /// Access gateway, when a remote tier is attached.
    pub fn gateway(&self) -> Option<&SecureAccessGateway> {
        self.gateway.as_ref()
    }

    /// Store a file under today's logical path.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, bytes: Vec<u8>, name: &str) -> FolioResult<FileDescriptor> {
        let path = LogicalPath::for_file(name, Utc::now().date_naive());
        self.store.put(bytes, name, path.as_str()).await
    }

    /// Every file with a usable URL where one can be had.
    pub async fn files(&self) -> FolioResult<Vec<FileDescriptor>> {
        let descriptors = self.store.list().await?;
        Ok(match &self.gateway {
            Some(gateway) => gateway.attach_access_urls(descriptors).await,
            None => descriptors,
        })
    }

    /// Resolve every media tag in `content` against the current file set.
    pub async fn render(&self, content: &str) -> FolioResult<String> {
        Ok(self.render_detailed(content).await?.text)
    }

    /// Like [`render`](Self::render), with per-tag outcomes.
    #[tracing::instrument(skip(self, content), fields(len = content.len()))]
    pub async fn render_detailed(&self, content: &str) -> FolioResult<ResolvedContent> {
        let files = self.files().await?;
        Ok(self.resolver.resolve_detailed(content, &files).await)
    }
}
