//! String-only key/value tier.
//!
//! The string-only tier is small and capacity constrained. It plays two roles:
//! fallback home for payloads the binary tier refused (stored as `data:` URIs)
//! and home of the metadata mirror that makes listing cheap and resilient.

use crate::{BlobTier, data_uri};
use folio_core::{FileDescriptor, StorageTier};
use folio_error::{FolioResult, StorageError, StorageErrorKind};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Synchronous string key/value backend with a byte quota.
///
/// Implementations account `key.len() + value.len()` bytes per entry and must
/// reject writes that would exceed their capacity with
/// [`StorageErrorKind::TierRejected`].
pub trait KeyValueBackend: Send + Sync {
    /// Read a value.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Insert or replace a value.
    fn set_item(&self, key: &str, value: String) -> FolioResult<()>;

    /// Remove a value, returning whether it existed.
    fn remove_item(&self, key: &str) -> FolioResult<bool>;

    /// Every key starting with `prefix`, in sorted order.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Bytes currently used.
    fn used_bytes(&self) -> u64;

    /// Total byte quota.
    fn capacity_bytes(&self) -> u64;
}

/// In-process key/value backend with a fixed byte quota.
#[derive(Debug)]
pub struct MemoryKeyValueStore {
    capacity_bytes: u64,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store holding at most `capacity_bytes`.
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn entry_size(key: &str, value: &str) -> u64 {
        (key.len() + value.len()) as u64
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> R) -> R {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut entries)
    }
}

impl KeyValueBackend for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> FolioResult<()> {
        let capacity = self.capacity_bytes;
        self.with_entries(|entries| {
            let used: u64 = entries.iter().map(|(k, v)| Self::entry_size(k, v)).sum();
            let replaced = entries
                .get(key)
                .map(|old| Self::entry_size(key, old))
                .unwrap_or(0);
            let needed = Self::entry_size(key, &value);
            if used - replaced + needed > capacity {
                return Err(StorageError::new(StorageErrorKind::TierRejected {
                    tier: StorageTier::EphemeralKv,
                    reason: format!(
                        "quota exceeded: {} bytes needed, {} of {} in use",
                        needed, used, capacity
                    ),
                })
                .into());
            }
            entries.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove_item(&self, key: &str) -> FolioResult<bool> {
        Ok(self.with_entries(|entries| entries.remove(key).is_some()))
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.with_entries(|entries| {
            entries
                .range(prefix.to_string()..)
                .take_while(|(k, _)| k.starts_with(prefix))
                .map(|(k, _)| k.clone())
                .collect()
        })
    }

    fn used_bytes(&self) -> u64 {
        self.with_entries(|entries| entries.iter().map(|(k, v)| Self::entry_size(k, v)).sum())
    }

    fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }
}

fn meta_prefix(namespace: &str) -> String {
    format!("{}:meta:", namespace)
}

fn blob_prefix(namespace: &str) -> String {
    format!("{}:blob:", namespace)
}

/// Lightweight descriptor records kept in the string-only tier for every file.
///
/// Records never carry ephemeral handles; see [`FileDescriptor::to_mirror_record`].
#[derive(Clone)]
pub struct MetadataMirror {
    backend: Arc<dyn KeyValueBackend>,
    namespace: String,
}

impl MetadataMirror {
    /// Create a mirror over `backend` scoped to `namespace`.
    pub fn new(backend: Arc<dyn KeyValueBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    fn key(&self, id: Uuid) -> String {
        format!("{}{}", meta_prefix(&self.namespace), id)
    }

    /// Insert or replace the record for `descriptor.id`.
    pub fn upsert(&self, descriptor: &FileDescriptor) -> FolioResult<()> {
        let json = serde_json::to_string(&descriptor.to_mirror_record()).map_err(|e| {
            StorageError::new(StorageErrorKind::Encoding(format!(
                "mirror record for {}: {}",
                descriptor.id, e
            )))
        })?;
        self.backend.set_item(&self.key(descriptor.id), json)
    }

    /// Look up a record by id.
    pub fn get(&self, id: Uuid) -> Option<FileDescriptor> {
        let raw = self.backend.get_item(&self.key(id))?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(%id, error = %e, "Skipping unreadable mirror record");
                None
            }
        }
    }

    /// Remove a record, returning whether it existed.
    pub fn remove(&self, id: Uuid) -> FolioResult<bool> {
        self.backend.remove_item(&self.key(id))
    }

    /// Every readable record.
    pub fn all(&self) -> Vec<FileDescriptor> {
        let prefix = meta_prefix(&self.namespace);
        self.backend
            .keys_with_prefix(&prefix)
            .into_iter()
            .filter_map(|key| {
                let id = Uuid::parse_str(key.strip_prefix(&prefix)?).ok()?;
                self.get(id)
            })
            .collect()
    }

    /// Remove every record in this namespace.
    pub fn clear(&self) -> FolioResult<usize> {
        let keys = self.backend.keys_with_prefix(&meta_prefix(&self.namespace));
        let mut removed = 0;
        for key in keys {
            if self.backend.remove_item(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Blob tier over the string-only backend, storing payloads as `data:` URIs.
#[derive(Clone)]
pub struct KeyValueTier {
    backend: Arc<dyn KeyValueBackend>,
    namespace: String,
}

impl KeyValueTier {
    /// Create a tier over `backend` scoped to `namespace`.
    pub fn new(backend: Arc<dyn KeyValueBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    fn key(&self, id: Uuid) -> String {
        format!("{}{}", blob_prefix(&self.namespace), id)
    }

    /// Bytes used by the whole backend, payloads and metadata together.
    pub fn used_bytes(&self) -> u64 {
        self.backend.used_bytes()
    }

    /// Capacity of the whole backend.
    pub fn capacity_bytes(&self) -> u64 {
        self.backend.capacity_bytes()
    }

    /// Raw stored `data:` URI for a descriptor, if present.
    pub fn data_uri(&self, id: Uuid) -> Option<String> {
        self.backend.get_item(&self.key(id))
    }
}

#[async_trait::async_trait]
impl BlobTier for KeyValueTier {
    fn tier(&self) -> StorageTier {
        StorageTier::EphemeralKv
    }

    #[tracing::instrument(skip(self, descriptor, bytes), fields(id = %descriptor.id, size = bytes.len()))]
    async fn write(&self, descriptor: &FileDescriptor, bytes: &[u8]) -> FolioResult<()> {
        let uri = data_uri::encode(&descriptor.mime_type, bytes);
        self.backend.set_item(&self.key(descriptor.id), uri)?;
        tracing::debug!("Stored payload as data URI");
        Ok(())
    }

    async fn read(&self, descriptor: &FileDescriptor) -> FolioResult<Vec<u8>> {
        let uri = self.data_uri(descriptor.id).ok_or_else(|| {
            StorageError::new(StorageErrorKind::BlobNotFound(descriptor.id.to_string()))
        })?;
        let (_, bytes) = data_uri::decode(&uri).map_err(|e| {
            StorageError::new(StorageErrorKind::HandleReconstruction(format!(
                "{}: {}",
                descriptor.name, e
            )))
        })?;
        Ok(bytes)
    }

    async fn remove(&self, descriptor: &FileDescriptor) -> FolioResult<bool> {
        self.backend.remove_item(&self.key(descriptor.id))
    }

    async fn records(&self) -> FolioResult<Vec<FileDescriptor>> {
        let mirror = MetadataMirror::new(Arc::clone(&self.backend), self.namespace.clone());
        let prefix = blob_prefix(&self.namespace);
        Ok(self
            .backend
            .keys_with_prefix(&prefix)
            .into_iter()
            .filter_map(|key| Uuid::parse_str(key.strip_prefix(&prefix)?).ok())
            .filter_map(|id| mirror.get(id))
            .filter(|record| record.tier == StorageTier::EphemeralKv)
            .collect())
    }

    async fn clear(&self) -> FolioResult<()> {
        for key in self.backend.keys_with_prefix(&blob_prefix(&self.namespace)) {
            self.backend.remove_item(&key)?;
        }
        Ok(())
    }
}
