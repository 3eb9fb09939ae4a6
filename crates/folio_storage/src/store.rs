//! Tiered blob store.
//!
//! Orchestrates the binary-capable, string-only and remote tiers behind one
//! API. Bytes land in the first ephemeral tier that accepts them; a metadata
//! record for every file is mirrored into the string-only tier so listing
//! stays cheap even when the binary tier is unavailable.

use crate::{
    BlobTier, FileSystemTier, HANDLE_PREFIX, HandleRegistry, KeyValueBackend, KeyValueTier,
    MemoryKeyValueStore, MetadataMirror, RemoteObjectGateway, RemoteTier, StorageConfig,
    descriptor_from_listing, object_key_for, remote_id_for_key,
};
use chrono::Utc;
use folio_core::{FileDescriptor, StorageTier, UsageReport, format_file_size, validate_file};
use folio_error::{FolioError, FolioResult, StorageError, StorageErrorKind};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

/// One API over every storage tier.
///
/// Mutations (`put`, `delete`, `clear`, `promote`) are serialized through a
/// write gate; reads (`list`, `get`, `usage`) share it. A `list` therefore
/// never observes a mirror record whose bytes are still being written.
pub struct TieredBlobStore {
    config: StorageConfig,
    binary: Option<Arc<dyn BlobTier>>,
    kv: KeyValueTier,
    mirror: MetadataMirror,
    remote: Option<RemoteTier>,
    handles: HandleRegistry,
    tombstones: Mutex<HashSet<Uuid>>,
    gate: RwLock<()>,
}

impl std::fmt::Debug for TieredBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredBlobStore")
            .field("namespace", self.config.namespace())
            .field("binary", &self.binary.is_some())
            .field("remote", &self.remote.is_some())
            .field("live_handles", &self.handles.live_count())
            .finish()
    }
}

impl TieredBlobStore {
    /// Create a store with only the string-only tier.
    ///
    /// Add the other tiers with [`with_binary`](Self::with_binary) and
    /// [`with_remote`](Self::with_remote).
    pub fn new(config: StorageConfig, kv_backend: Arc<dyn KeyValueBackend>) -> Self {
        let namespace = config.namespace().clone();
        Self {
            kv: KeyValueTier::new(Arc::clone(&kv_backend), namespace.clone()),
            mirror: MetadataMirror::new(kv_backend, namespace),
            config,
            binary: None,
            remote: None,
            handles: HandleRegistry::new(),
            tombstones: Mutex::new(HashSet::new()),
            gate: RwLock::new(()),
        }
    }

    /// Build a store from configuration.
    ///
    /// The binary tier lives under [`StorageConfig::resolved_binary_dir`]. If
    /// that directory cannot be created the store runs without it.
    pub fn from_config(config: StorageConfig) -> Self {
        let kv: Arc<dyn KeyValueBackend> =
            Arc::new(MemoryKeyValueStore::new(*config.kv_capacity_bytes()));
        let binary = if *config.binary_enabled() {
            match FileSystemTier::new(config.resolved_binary_dir(), *config.binary_capacity_bytes())
            {
                Ok(tier) => Some(Arc::new(tier) as Arc<dyn BlobTier>),
                Err(e) => {
                    tracing::warn!(error = %e, "Binary tier unavailable, using string-only tier");
                    None
                }
            }
        } else {
            None
        };

        let store = Self::new(config, kv);
        match binary {
            Some(tier) => store.with_binary(tier),
            None => store,
        }
    }

    /// Attach a binary-capable tier.
    pub fn with_binary(mut self, tier: Arc<dyn BlobTier>) -> Self {
        self.binary = Some(tier);
        self
    }

    /// Attach the remote durable tier.
    pub fn with_remote(mut self, gateway: Arc<dyn RemoteObjectGateway>) -> Self {
        self.remote = Some(RemoteTier::new(gateway));
        self
    }

    /// Store configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Local handle registry.
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Metadata mirror in the string-only tier.
    pub fn mirror(&self) -> &MetadataMirror {
        &self.mirror
    }

    /// Remote object gateway, if the remote tier is attached.
    pub fn remote_gateway(&self) -> Option<&Arc<dyn RemoteObjectGateway>> {
        self.remote.as_ref().map(RemoteTier::gateway)
    }

    fn tier_for(&self, tier: StorageTier) -> Option<&dyn BlobTier> {
        match tier {
            StorageTier::EphemeralBinary => self.binary.as_deref(),
            StorageTier::EphemeralKv => Some(&self.kv),
            StorageTier::Remote => self.remote.as_ref().map(|r| r as &dyn BlobTier),
        }
    }

    fn is_tombstoned(&self, id: Uuid) -> bool {
        self.tombstones
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    fn exhausted(usage: UsageReport) -> FolioError {
        StorageError::new(StorageErrorKind::Exhausted(Box::new(usage))).into()
    }

    /// Store a file in the first ephemeral tier that accepts it.
    ///
    /// # Errors
    ///
    /// - `InvalidFile` if the name or size fails validation
    /// - `Exhausted` with a usage snapshot if every ephemeral tier refused
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn put(
        &self,
        bytes: Vec<u8>,
        name: &str,
        logical_path: &str,
    ) -> FolioResult<FileDescriptor> {
        let _gate = self.gate.write().await;

        validate_file(name, bytes.len() as u64, *self.config.max_file_bytes())
            .map_err(|reason| StorageError::new(StorageErrorKind::InvalidFile(reason)))?;

        let mut descriptor = FileDescriptor::new(
            name,
            logical_path,
            bytes.len() as u64,
            StorageTier::EphemeralBinary,
        );
        self.write_ephemeral(&mut descriptor, &bytes).await?;

        if let Err(e) = self.mirror.upsert(&descriptor) {
            if let Some(tier) = self.tier_for(descriptor.tier)
                && let Err(rollback) = tier.remove(&descriptor).await
            {
                tracing::error!(id = %descriptor.id, error = %rollback, "Rollback after mirror failure left bytes behind");
            }
            let capacity = e.as_storage().is_some_and(StorageError::is_capacity);
            if capacity {
                return Err(Self::exhausted(self.usage_unlocked().await?));
            }
            return Err(e);
        }

        self.tombstones
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&descriptor.id);
        self.handles.mint(&mut descriptor, bytes)?;

        tracing::info!(
            id = %descriptor.id,
            tier = %descriptor.tier,
            size = %format_file_size(descriptor.size_bytes),
            "Stored file"
        );
        Ok(descriptor)
    }

    async fn write_ephemeral(&self, descriptor: &mut FileDescriptor, bytes: &[u8]) -> FolioResult<()> {
        if let Some(binary) = &self.binary {
            descriptor.tier = StorageTier::EphemeralBinary;
            match binary.write(descriptor, bytes).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(id = %descriptor.id, error = %e, "Binary tier rejected write, falling back to string-only tier");
                }
            }
        }

        descriptor.tier = StorageTier::EphemeralKv;
        match self.kv.write(descriptor, bytes).await {
            Ok(()) => Ok(()),
            Err(e) if e.as_storage().is_some_and(StorageError::is_capacity) => {
                tracing::warn!(id = %descriptor.id, error = %e, "String-only tier exhausted");
                Err(Self::exhausted(self.usage_unlocked().await?))
            }
            Err(e) => Err(e),
        }
    }

    /// Merged descriptor records from every tier, without handles.
    async fn collect_records(&self) -> FolioResult<Vec<FileDescriptor>> {
        let mut merged: BTreeMap<Uuid, FileDescriptor> = BTreeMap::new();

        if let Some(binary) = &self.binary {
            match binary.records().await {
                Ok(records) => {
                    for record in records {
                        merged.insert(record.id, record);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Binary tier listing failed, relying on mirror"),
            }
        }

        // Mirror records take precedence over sidecars.
        for record in self.mirror.all() {
            merged.insert(record.id, record);
        }

        if let Some(remote) = &self.remote {
            match remote.gateway().list_objects().await {
                Ok(objects) => {
                    let by_key: HashMap<String, Uuid> = merged
                        .values()
                        .filter(|d| d.tier == StorageTier::Remote)
                        .map(|d| (d.handle.clone(), d.id))
                        .collect();
                    for info in objects {
                        match by_key.get(&info.key).and_then(|id| merged.get_mut(id)) {
                            Some(record) => record.size_bytes = info.size,
                            None => {
                                let derived = descriptor_from_listing(&info);
                                merged.entry(derived.id).or_insert(derived);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Remote listing failed, using mirrored remote records")
                }
            }
        }

        let tombstones = self
            .tombstones
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let mut records: Vec<FileDescriptor> = merged
            .into_values()
            .filter(|d| !tombstones.contains(&d.id))
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn find_record(&self, id: Uuid) -> FolioResult<Option<FileDescriptor>> {
        if self.is_tombstoned(id) {
            return Ok(None);
        }
        if let Some(record) = self.mirror.get(id) {
            return Ok(Some(record));
        }
        if let Some(binary) = &self.binary
            && let Some(record) = binary.record(id).await?
        {
            return Ok(Some(record));
        }
        if let Some(remote) = &self.remote {
            match remote.gateway().list_objects().await {
                Ok(objects) => {
                    return Ok(objects
                        .iter()
                        .find(|info| remote_id_for_key(&info.key) == id)
                        .map(descriptor_from_listing));
                }
                Err(e) => tracing::warn!(%id, error = %e, "Remote listing failed during lookup"),
            }
        }
        Ok(None)
    }

    /// Regenerate the local handle for an ephemeral record.
    ///
    /// Missing bytes drop the record; unusable bytes keep it with an empty
    /// handle so callers can ask for a re-upload.
    async fn refresh(&self, record: FileDescriptor) -> Option<FileDescriptor> {
        if !record.tier.is_ephemeral() {
            return Some(record);
        }
        let Some(tier) = self.tier_for(record.tier) else {
            tracing::warn!(id = %record.id, tier = %record.tier, "Tier holding this file is not attached");
            let mut record = record;
            record.handle.clear();
            return Some(record);
        };
        match self.handles.refresh(tier, record.clone()).await {
            Ok(descriptor) => Some(descriptor),
            Err(e) => match e.as_storage().map(|s| &s.kind) {
                Some(StorageErrorKind::BlobNotFound(_)) => {
                    tracing::warn!(id = %record.id, "Mirror record has no bytes, skipping");
                    None
                }
                _ => {
                    tracing::warn!(id = %record.id, error = %e, "Could not regenerate handle");
                    let mut record = record;
                    record.handle.clear();
                    Some(record)
                }
            },
        }
    }

    /// Every live descriptor, deduplicated by id, with fresh local handles.
    ///
    /// Each ephemeral descriptor costs one tier read and one handle mint.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> FolioResult<Vec<FileDescriptor>> {
        let _gate = self.gate.read().await;
        let records = self.collect_records().await?;
        let mut descriptors = Vec::with_capacity(records.len());
        for record in records {
            if let Some(descriptor) = self.refresh(record).await {
                descriptors.push(descriptor);
            }
        }
        tracing::debug!(count = descriptors.len(), "Listed files");
        Ok(descriptors)
    }

    /// Look up one descriptor with a fresh local handle.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> FolioResult<Option<FileDescriptor>> {
        let _gate = self.gate.read().await;
        match self.find_record(id).await? {
            Some(record) => Ok(self.refresh(record).await),
            None => Ok(None),
        }
    }

    /// Raw bytes for an ephemeral descriptor.
    ///
    /// # Errors
    ///
    /// `BlobNotFound` if no tier holds `id`.
    pub async fn read_bytes(&self, id: Uuid) -> FolioResult<Vec<u8>> {
        let _gate = self.gate.read().await;
        let record = self
            .find_record(id)
            .await?
            .ok_or_else(|| StorageError::new(StorageErrorKind::BlobNotFound(id.to_string())))?;
        let tier = self.tier_for(record.tier).ok_or_else(|| {
            StorageError::new(StorageErrorKind::Unavailable(format!("{} tier", record.tier)))
        })?;
        tier.read(&record).await
    }

    /// Delete a file from its authoritative tier and the metadata mirror.
    ///
    /// Returns `false` for an unknown id. If the mirror record cannot be
    /// removed the inconsistency is logged and the id is hidden from later
    /// listings; the removal is not retried.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> FolioResult<bool> {
        let _gate = self.gate.write().await;
        let Some(record) = self.find_record(id).await? else {
            tracing::debug!("Delete of unknown id");
            return Ok(false);
        };

        let blob_removed = match self.tier_for(record.tier) {
            Some(tier) => tier.remove(&record).await?,
            None => false,
        };

        // Leftovers from an interrupted promotion or fallback.
        for tier in [StorageTier::EphemeralBinary, StorageTier::EphemeralKv] {
            if tier == record.tier {
                continue;
            }
            if let Some(other) = self.tier_for(tier)
                && let Err(e) = other.remove(&record).await
            {
                tracing::debug!(%tier, error = %e, "Leftover cleanup failed");
            }
        }

        let mirror_removed = match self.mirror.remove(id) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(error = %e, "Blob removed but mirror record remains; hiding id");
                self.tombstones
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(id);
                false
            }
        };

        self.handles.revoke(id);
        tracing::info!(blob_removed, mirror_removed, "Deleted file");
        Ok(blob_removed || mirror_removed)
    }

    /// Wipe every ephemeral tier under this store's namespace.
    ///
    /// Remote objects are durable and left in place.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> FolioResult<()> {
        let _gate = self.gate.write().await;
        if let Some(binary) = &self.binary {
            binary.clear().await?;
        }
        self.kv.clear().await?;
        let records = self.mirror.clear()?;
        self.handles.revoke_all();
        tracing::info!(records, "Cleared ephemeral tiers");
        Ok(())
    }

    /// Bytes and counts across every tier.
    pub async fn usage(&self) -> FolioResult<UsageReport> {
        let _gate = self.gate.read().await;
        self.usage_unlocked().await
    }

    async fn usage_unlocked(&self) -> FolioResult<UsageReport> {
        let records = self.collect_records().await?;
        Ok(UsageReport::new(
            &records,
            self.kv.used_bytes(),
            self.kv.capacity_bytes(),
        ))
    }

    /// Move an ephemeral file to the remote tier.
    ///
    /// The object is written first, then the mirror is pointed at it, then the
    /// local bytes are dropped. Already-remote files are returned unchanged.
    ///
    /// # Errors
    ///
    /// - `BlobNotFound` for an unknown id
    /// - `Unavailable` if no remote tier is attached
    #[tracing::instrument(skip(self))]
    pub async fn promote(&self, id: Uuid) -> FolioResult<FileDescriptor> {
        let _gate = self.gate.write().await;
        let record = self
            .find_record(id)
            .await?
            .ok_or_else(|| StorageError::new(StorageErrorKind::BlobNotFound(id.to_string())))?;
        if record.tier == StorageTier::Remote {
            return Ok(record);
        }

        let remote = self.remote.as_ref().ok_or_else(|| {
            StorageError::new(StorageErrorKind::Unavailable("no remote tier attached".to_string()))
        })?;
        let source = self.tier_for(record.tier).ok_or_else(|| {
            StorageError::new(StorageErrorKind::Unavailable(format!("{} tier", record.tier)))
        })?;
        let bytes = source.read(&record).await?;

        let now = Utc::now();
        let mut promoted = record.clone();
        promoted.tier = StorageTier::Remote;
        promoted.handle = object_key_for(&record, now);
        promoted.access_url = None;
        promoted.refreshed_at = now.max(record.refreshed_at);
        remote.write(&promoted, &bytes).await?;

        if let Err(e) = self.mirror.upsert(&promoted) {
            if let Err(rollback) = remote.remove(&promoted).await {
                tracing::error!(key = %promoted.handle, error = %rollback, "Remote object orphaned after mirror failure");
            }
            return Err(e);
        }

        if let Err(e) = source.remove(&record).await {
            tracing::warn!(error = %e, "Promoted file left local bytes behind");
        }
        self.handles.revoke(id);

        tracing::info!(key = %promoted.handle, "Promoted file to remote tier");
        Ok(promoted)
    }

    /// Rebuild a usable descriptor from the metadata mirror.
    ///
    /// Looks up the mirror by id, then by name, and regenerates the local
    /// handle. Returns `None` when the mirror has nothing usable.
    #[tracing::instrument(skip(self, descriptor), fields(id = %descriptor.id, name = %descriptor.name))]
    pub async fn recover(&self, descriptor: &FileDescriptor) -> Option<FileDescriptor> {
        let _gate = self.gate.read().await;
        if self.is_tombstoned(descriptor.id) {
            return None;
        }
        let record = self.mirror.get(descriptor.id).or_else(|| {
            self.mirror
                .all()
                .into_iter()
                .find(|r| r.name == descriptor.name)
        })?;
        let recovered = self.refresh(record).await?;
        if recovered.tier.is_ephemeral() && recovered.display_url().is_none() {
            return None;
        }
        Some(recovered)
    }

    /// Whether a URL handed out by this store still resolves.
    ///
    /// Non-local URLs are assumed reachable.
    pub fn is_live(&self, url: &str) -> bool {
        if url.starts_with(HANDLE_PREFIX) {
            self.handles.is_live(url)
        } else {
            true
        }
    }
}
