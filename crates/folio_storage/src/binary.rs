//! Filesystem-backed binary tier.
//!
//! This backend keeps raw bytes in a session scratch directory, organized by
//! media type. It survives a crash of the hosting process but is not meant to
//! outlive the machine's temp directory.

use crate::BlobTier;
use folio_core::{FileDescriptor, StorageTier};
use folio_error::{FolioResult, StorageError, StorageErrorKind};
use std::path::PathBuf;
use uuid::Uuid;

/// Binary-capable tier storing payloads as files.
///
/// # Example Structure
///
/// ```text
/// /tmp/folio-media/folio/
/// ├── images/
/// │   └── 3f/
/// │       ├── 3f2a...e1.bin    (payload)
/// │       └── 3f2a...e1.json   (descriptor sidecar)
/// └── videos/
///     └── a0/
///         ├── a07c...9d.bin
///         └── a07c...9d.json
/// ```
///
/// The sidecar is written after the payload, so a sidecar always points at
/// complete bytes. Both files are written to a temp path and renamed.
pub struct FileSystemTier {
    base_path: PathBuf,
    capacity_bytes: u64,
}

impl FileSystemTier {
    /// Create a new filesystem tier rooted at `base_path`.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>, capacity_bytes: u64) -> FolioResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), capacity_bytes, "Created filesystem tier");
        Ok(Self {
            base_path,
            capacity_bytes,
        })
    }

    /// Directory holding a descriptor's payload and sidecar.
    ///
    /// Structure: `{base}/{media folder}/{id[0:2]}/`
    fn dir_for(&self, descriptor: &FileDescriptor) -> PathBuf {
        let id = descriptor.id.simple().to_string();
        self.base_path
            .join(descriptor.media_type().folder())
            .join(&id[0..2])
    }

    fn payload_path(&self, descriptor: &FileDescriptor) -> PathBuf {
        self.dir_for(descriptor)
            .join(format!("{}.bin", descriptor.id.simple()))
    }

    fn sidecar_path(&self, descriptor: &FileDescriptor) -> PathBuf {
        self.dir_for(descriptor)
            .join(format!("{}.json", descriptor.id.simple()))
    }

    async fn write_atomic(path: &PathBuf, data: &[u8]) -> FolioResult<()> {
        let mut temp_path = path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;
        Ok(())
    }

    async fn remove_if_present(path: &PathBuf) -> FolioResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    /// Collect every sidecar path below the base directory.
    async fn sidecars(&self) -> FolioResult<Vec<PathBuf>> {
        let mut pending = vec![self.base_path.clone()];
        let mut found = Vec::new();
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        dir.display(),
                        e
                    )))
                    .into());
                }
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
            })? {
                let path = entry.path();
                let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
                if is_dir {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    found.push(path);
                }
            }
        }
        Ok(found)
    }

    /// Bytes currently held, summed from sidecar sizes.
    pub async fn used_bytes(&self) -> FolioResult<u64> {
        Ok(self.records().await?.iter().map(|r| r.size_bytes).sum())
    }
}

#[async_trait::async_trait]
impl BlobTier for FileSystemTier {
    fn tier(&self) -> StorageTier {
        StorageTier::EphemeralBinary
    }

    #[tracing::instrument(skip(self, descriptor, data), fields(id = %descriptor.id, size = data.len()))]
    async fn write(&self, descriptor: &FileDescriptor, data: &[u8]) -> FolioResult<()> {
        let used = self.used_bytes().await?;
        if used + data.len() as u64 > self.capacity_bytes {
            return Err(StorageError::new(StorageErrorKind::TierRejected {
                tier: StorageTier::EphemeralBinary,
                reason: format!(
                    "capacity exceeded: {} bytes needed, {} of {} in use",
                    data.len(),
                    used,
                    self.capacity_bytes
                ),
            })
            .into());
        }

        let dir = self.dir_for(descriptor);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let sidecar = serde_json::to_vec(&descriptor.to_mirror_record()).map_err(|e| {
            StorageError::new(StorageErrorKind::Encoding(format!(
                "sidecar for {}: {}",
                descriptor.id, e
            )))
        })?;

        let payload_path = self.payload_path(descriptor);
        Self::write_atomic(&payload_path, data).await?;
        if let Err(e) = Self::write_atomic(&self.sidecar_path(descriptor), &sidecar).await {
            Self::remove_if_present(&payload_path).await?;
            return Err(e);
        }

        tracing::info!(path = %payload_path.display(), "Stored payload in binary tier");
        Ok(())
    }

    async fn read(&self, descriptor: &FileDescriptor) -> FolioResult<Vec<u8>> {
        let path = self.payload_path(descriptor);
        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::BlobNotFound(descriptor.id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(id = %descriptor.id, size = data.len(), "Read payload from binary tier");
        Ok(data)
    }

    #[tracing::instrument(skip(self, descriptor), fields(id = %descriptor.id))]
    async fn remove(&self, descriptor: &FileDescriptor) -> FolioResult<bool> {
        // Sidecar first so a crash never leaves a record pointing at missing bytes.
        let sidecar = Self::remove_if_present(&self.sidecar_path(descriptor)).await?;
        let payload = Self::remove_if_present(&self.payload_path(descriptor)).await?;
        if sidecar || payload {
            tracing::info!("Deleted payload from binary tier");
        }
        Ok(sidecar || payload)
    }

    async fn records(&self) -> FolioResult<Vec<FileDescriptor>> {
        let mut records = Vec::new();
        for path in self.sidecars().await? {
            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable sidecar");
                    continue;
                }
            };
            match serde_json::from_slice::<FileDescriptor>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping malformed sidecar")
                }
            }
        }
        Ok(records)
    }

    async fn record(&self, id: Uuid) -> FolioResult<Option<FileDescriptor>> {
        let file_name = format!("{}.json", id.simple());
        for path in self.sidecars().await? {
            if path.file_name().is_some_and(|name| name == file_name.as_str()) {
                let raw = tokio::fs::read(&path).await.map_err(|e| {
                    StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                })?;
                let record = serde_json::from_slice(&raw).map_err(|e| {
                    StorageError::new(StorageErrorKind::Encoding(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                })?;
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    #[tracing::instrument(skip(self), fields(path = %self.base_path.display()))]
    async fn clear(&self) -> FolioResult<()> {
        match tokio::fs::remove_dir_all(&self.base_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                    "clear {}: {}",
                    self.base_path.display(),
                    e
                )))
                .into());
            }
        }
        tokio::fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))
        })?;
        tracing::info!("Cleared binary tier");
        Ok(())
    }
}
