//! Local handle lifecycle.
//!
//! Ephemeral tiers hand out session-scoped handles (`blob:folio/<session>/<nonce>`)
//! that stop resolving when the session restarts. The registry owns the bytes
//! behind every live handle and regenerates handles from tier bytes on demand.

use crate::BlobTier;
use chrono::Utc;
use folio_core::FileDescriptor;
use folio_error::{FolioResult, StorageError, StorageErrorKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// URL scheme prefix shared by every handle this registry mints.
pub const HANDLE_PREFIX: &str = "blob:folio/";

/// Bytes reachable through a live handle.
#[derive(Debug, Clone)]
pub struct LiveBlob {
    /// Descriptor the handle was minted for
    pub id: Uuid,
    /// MIME type served with the bytes
    pub mime_type: String,
    /// Payload
    pub bytes: Arc<[u8]>,
}

#[derive(Debug)]
struct Registry {
    session: Uuid,
    live: HashMap<String, LiveBlob>,
    by_id: HashMap<Uuid, String>,
}

impl Registry {
    fn fresh() -> Self {
        Self {
            session: Uuid::new_v4(),
            live: HashMap::new(),
            by_id: HashMap::new(),
        }
    }

    fn revoke(&mut self, id: Uuid) -> bool {
        match self.by_id.remove(&id) {
            Some(handle) => self.live.remove(&handle).is_some(),
            None => false,
        }
    }
}

/// Session-scoped registry of local handles.
#[derive(Debug, Clone)]
pub struct HandleRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleRegistry {
    /// Start a new session with no live handles.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::fresh())),
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current session id.
    pub fn session(&self) -> Uuid {
        self.registry().session
    }

    /// Mint a fresh handle for `descriptor` over `bytes`.
    ///
    /// Any handle previously minted for the same id is revoked, and
    /// `refreshed_at` never moves backwards.
    ///
    /// # Errors
    ///
    /// Returns `StorageErrorKind::HandleReconstruction` when the bytes do not
    /// match the descriptor's recorded size.
    #[tracing::instrument(skip(self, descriptor, bytes), fields(id = %descriptor.id))]
    pub fn mint(&self, descriptor: &mut FileDescriptor, bytes: Vec<u8>) -> FolioResult<()> {
        if bytes.len() as u64 != descriptor.size_bytes {
            return Err(StorageError::new(StorageErrorKind::HandleReconstruction(format!(
                "{}: expected {} bytes, tier returned {}",
                descriptor.name,
                descriptor.size_bytes,
                bytes.len()
            )))
            .into());
        }

        let mut registry = self.registry();
        registry.revoke(descriptor.id);
        let handle = format!(
            "{}{}/{}",
            HANDLE_PREFIX,
            registry.session.simple(),
            Uuid::new_v4().simple()
        );
        registry.live.insert(
            handle.clone(),
            LiveBlob {
                id: descriptor.id,
                mime_type: descriptor.mime_type.clone(),
                bytes: Arc::from(bytes),
            },
        );
        registry.by_id.insert(descriptor.id, handle.clone());
        drop(registry);

        descriptor.handle = handle;
        descriptor.refreshed_at = Utc::now().max(descriptor.refreshed_at);
        tracing::debug!(handle = %descriptor.handle, "Minted local handle");
        Ok(())
    }

    /// Read bytes from `tier` and mint a handle for them.
    ///
    /// Remote descriptors are returned untouched: their handle is a bucket key
    /// and their display URL comes from the access gateway.
    pub async fn refresh(
        &self,
        tier: &dyn BlobTier,
        mut descriptor: FileDescriptor,
    ) -> FolioResult<FileDescriptor> {
        if !descriptor.tier.is_ephemeral() {
            return Ok(descriptor);
        }
        let bytes = tier.read(&descriptor).await?;
        self.mint(&mut descriptor, bytes)?;
        Ok(descriptor)
    }

    /// Bytes behind a live handle.
    pub fn resolve(&self, handle: &str) -> Option<LiveBlob> {
        self.registry().live.get(handle).cloned()
    }

    /// Whether `handle` still resolves in this session.
    pub fn is_live(&self, handle: &str) -> bool {
        self.registry().live.contains_key(handle)
    }

    /// Current handle for a descriptor id, if one is live.
    pub fn handle_for(&self, id: Uuid) -> Option<String> {
        self.registry().by_id.get(&id).cloned()
    }

    /// Revoke the handle minted for `id`.
    pub fn revoke(&self, id: Uuid) -> bool {
        self.registry().revoke(id)
    }

    /// Revoke every handle without starting a new session.
    pub fn revoke_all(&self) {
        let mut registry = self.registry();
        registry.live.clear();
        registry.by_id.clear();
    }

    /// Simulate a host restart: every handle dies and a new session begins.
    pub fn restart(&self) {
        let mut registry = self.registry();
        *registry = Registry::fresh();
        tracing::info!(session = %registry.session, "Handle session restarted");
    }

    /// Number of live handles.
    pub fn live_count(&self) -> usize {
        self.registry().live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::StorageTier;

    fn descriptor(size: u64) -> FileDescriptor {
        FileDescriptor::new("photo.png", "contents/images/2026/10/18/", size, StorageTier::EphemeralKv)
    }

    #[test]
    fn reminting_revokes_previous_handle() {
        let registry = HandleRegistry::new();
        let mut d = descriptor(3);
        registry.mint(&mut d, vec![1, 2, 3]).unwrap();
        let first = d.handle.clone();
        registry.mint(&mut d, vec![1, 2, 3]).unwrap();

        assert_ne!(first, d.handle);
        assert!(!registry.is_live(&first));
        assert!(registry.is_live(&d.handle));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn size_mismatch_is_reconstruction_failure() {
        let registry = HandleRegistry::new();
        let mut d = descriptor(10);
        let err = registry.mint(&mut d, vec![0; 4]).unwrap_err();
        assert!(matches!(
            err.as_storage().map(|e| &e.kind),
            Some(StorageErrorKind::HandleReconstruction(_))
        ));
        assert!(d.handle.is_empty());
    }

    #[test]
    fn restart_invalidates_every_handle() {
        let registry = HandleRegistry::new();
        let session = registry.session();
        let mut d = descriptor(1);
        registry.mint(&mut d, vec![9]).unwrap();
        registry.restart();

        assert_ne!(session, registry.session());
        assert!(registry.resolve(&d.handle).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn refreshed_at_never_decreases() {
        let registry = HandleRegistry::new();
        let mut d = descriptor(1);
        d.refreshed_at = Utc::now() + chrono::Duration::hours(1);
        let stamp = d.refreshed_at;
        registry.mint(&mut d, vec![0]).unwrap();
        assert!(d.refreshed_at >= stamp);
    }
}
