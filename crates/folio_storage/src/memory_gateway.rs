//! In-process object gateway for tests and local development.

use crate::{RemoteObject, RemoteObjectGateway, RemoteObjectInfo, UrlPurpose};
use chrono::{DateTime, Utc};
use folio_error::{FolioResult, GatewayError, GatewayErrorKind, StorageError, StorageErrorKind};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_puts: bool,
    fail_listing: bool,
    denied: HashSet<String>,
    hidden: HashSet<String>,
}

/// Bucket held in memory, with switchable faults.
///
/// Signed URLs look like
/// `https://{bucket}.s3.local/{key}?X-Amz-Expires={secs}&X-Folio-Method={purpose}&X-Folio-Signature={n}`
/// where `n` increases with every mint, so two mints never collide.
#[derive(Debug)]
pub struct InMemoryObjectGateway {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    faults: Mutex<Faults>,
    latency: Mutex<Option<Duration>>,
    signed: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl InMemoryObjectGateway {
    /// Create an empty bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Faults::default()),
            latency: Mutex::new(None),
            signed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent `put_object` fail.
    pub fn set_fail_puts(&self, fail: bool) {
        self.faults().fail_puts = fail;
    }

    /// Make every subsequent `list_objects` fail.
    pub fn set_fail_listing(&self, fail: bool) {
        self.faults().fail_listing = fail;
    }

    /// Refuse to sign URLs for `key`.
    pub fn deny(&self, key: impl Into<String>) {
        self.faults().denied.insert(key.into());
    }

    /// Leave `key` out of listings, simulating eventual consistency.
    pub fn hide_from_listing(&self, key: impl Into<String>) {
        self.faults().hidden.insert(key.into());
    }

    /// Delay every signing call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Seed an object directly, bypassing faults.
    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>, content_type: impl Into<String>) {
        self.objects().insert(
            key.into(),
            StoredObject {
                bytes,
                content_type: content_type.into(),
                last_modified: Utc::now(),
            },
        );
    }

    /// Stored bytes for `key`.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects().get(key).map(|o| o.bytes.clone())
    }

    /// Content type recorded for `key`.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects().get(key).map(|o| o.content_type.clone())
    }

    /// Every stored key.
    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    /// Number of URLs signed so far, including refused attempts.
    pub fn sign_calls(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }

    /// Highest number of signing calls observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RemoteObjectGateway for InMemoryObjectGateway {
    async fn put_object(
        &self,
        bytes: &[u8],
        key: &str,
        content_type: &str,
    ) -> FolioResult<RemoteObject> {
        if self.faults().fail_puts {
            return Err(StorageError::new(StorageErrorKind::Remote(format!(
                "put {} rejected by bucket {}",
                key, self.bucket
            )))
            .into());
        }
        self.insert(key, bytes.to_vec(), content_type);
        Ok(RemoteObject {
            key: key.to_string(),
        })
    }

    async fn get_signed_url(
        &self,
        key: &str,
        purpose: UrlPurpose,
        ttl: Duration,
    ) -> FolioResult<String> {
        let serial = self.signed.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if key.trim().is_empty() {
            return Err(
                GatewayError::new(GatewayErrorKind::InvalidRequest("empty key".to_string())).into(),
            );
        }
        if self.faults().denied.contains(key) {
            return Err(GatewayError::new(GatewayErrorKind::AccessDenied(key.to_string())).into());
        }
        Ok(format!(
            "https://{}.s3.local/{}?X-Amz-Expires={}&X-Folio-Method={}&X-Folio-Signature={}",
            self.bucket,
            key,
            ttl.as_secs(),
            purpose,
            serial
        ))
    }

    async fn delete_object(&self, key: &str) -> FolioResult<bool> {
        Ok(self.objects().remove(key).is_some())
    }

    async fn list_objects(&self) -> FolioResult<Vec<RemoteObjectInfo>> {
        let faults = self.faults();
        if faults.fail_listing {
            return Err(StorageError::new(StorageErrorKind::Remote(format!(
                "listing bucket {} failed",
                self.bucket
            )))
            .into());
        }
        let hidden = faults.hidden.clone();
        drop(faults);
        Ok(self
            .objects()
            .iter()
            .filter(|(key, _)| !hidden.contains(*key))
            .map(|(key, object)| RemoteObjectInfo {
                key: key.clone(),
                size: object.bytes.len() as u64,
                last_modified: object.last_modified,
            })
            .collect())
    }
}
