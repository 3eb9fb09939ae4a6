//! Time-limited URL minting for remote descriptors.

use crate::GatewayConfig;
use folio_core::{FileDescriptor, StorageTier};
use folio_error::{FolioResult, GatewayError, GatewayErrorKind};
use folio_storage::{RemoteObjectGateway, UrlPurpose};
use std::sync::Arc;

/// Mints display and upload URLs for objects in the private bucket.
///
/// URLs are never cached: every call asks the remote gateway again.
#[derive(Clone)]
pub struct SecureAccessGateway {
    remote: Arc<dyn RemoteObjectGateway>,
    config: GatewayConfig,
}

impl std::fmt::Debug for SecureAccessGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureAccessGateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SecureAccessGateway {
    /// Create a gateway over a remote object gateway.
    pub fn new(remote: Arc<dyn RemoteObjectGateway>, config: GatewayConfig) -> Self {
        Self { remote, config }
    }

    /// Gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn check_key(key: &str) -> FolioResult<()> {
        if key.trim().is_empty() {
            return Err(GatewayError::new(GatewayErrorKind::InvalidRequest(
                "empty object key".to_string(),
            ))
            .into());
        }
        Ok(())
    }

    /// Mint a display URL valid for the configured display TTL.
    ///
    /// # Errors
    ///
    /// `AccessDenied` when the remote refuses.
    #[tracing::instrument(skip(self))]
    pub async fn display_url(&self, key: &str) -> FolioResult<String> {
        Self::check_key(key)?;
        self.remote
            .get_signed_url(key, UrlPurpose::Get, self.config.display_ttl())
            .await
    }

    /// Mint a short-lived direct upload URL.
    #[tracing::instrument(skip(self))]
    pub async fn upload_url(&self, key: &str, content_type: &str) -> FolioResult<String> {
        Self::check_key(key)?;
        let url = self
            .remote
            .get_signed_url(key, UrlPurpose::Put, self.config.upload_ttl())
            .await?;
        tracing::debug!(content_type, "Minted upload URL");
        Ok(url)
    }

    /// Attach a fresh access URL to one remote descriptor.
    ///
    /// Failures are logged and leave the descriptor without a URL.
    pub async fn attach_access_url(&self, mut descriptor: FileDescriptor) -> FileDescriptor {
        if descriptor.tier != StorageTier::Remote {
            return descriptor;
        }
        descriptor.access_url = None;
        match self.display_url(&descriptor.handle).await {
            Ok(url) => descriptor.access_url = Some(url),
            Err(e) => {
                tracing::warn!(id = %descriptor.id, key = %descriptor.handle, error = %e, "Could not mint access URL");
            }
        }
        descriptor
    }

    /// Attach access URLs to every remote descriptor, in bounded batches.
    ///
    /// Remote descriptors are signed `batch_size` at a time, concurrently
    /// within a batch, with a pause between batches. Output order matches
    /// input order; ephemeral descriptors pass through untouched.
    #[tracing::instrument(skip(self, descriptors), fields(count = descriptors.len()))]
    pub async fn attach_access_urls(&self, descriptors: Vec<FileDescriptor>) -> Vec<FileDescriptor> {
        let batch_size = (*self.config.batch_size()).max(1);
        let mut slots = descriptors;
        let remote: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, d)| d.tier == StorageTier::Remote)
            .map(|(i, _)| i)
            .collect();

        for (batch, chunk) in remote.chunks(batch_size).enumerate() {
            if batch > 0 {
                tokio::time::sleep(self.config.batch_pause()).await;
            }
            let signed = futures::future::join_all(
                chunk
                    .iter()
                    .map(|&i| self.attach_access_url(slots[i].clone())),
            )
            .await;
            for (&i, descriptor) in chunk.iter().zip(signed) {
                slots[i] = descriptor;
            }
        }

        let minted = slots.iter().filter(|d| d.access_url.is_some()).count();
        tracing::debug!(remote = remote.len(), minted, "Attached access URLs");
        slots
    }
}
