//! Storage error types.

use folio_core::{StorageTier, UsageReport};

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StorageErrorKind {
    /// Every ephemeral tier rejected a write
    #[display("Storage exhausted: {}", _0)]
    Exhausted(Box<UsageReport>),
    /// No tier holds a live descriptor for the id
    #[display("Blob not found: {}", _0)]
    BlobNotFound(String),
    /// Bytes are present but could not be turned into a usable local handle
    #[display("Handle reconstruction failed: {}", _0)]
    HandleReconstruction(String),
    /// A single tier refused a write (capacity or unsupported environment)
    #[display("{} tier rejected write: {}", tier, reason)]
    TierRejected {
        /// Tier that refused the write
        tier: StorageTier,
        /// Why it refused
        reason: String,
    },
    /// File failed validation before ingestion
    #[display("Invalid file: {}", _0)]
    InvalidFile(String),
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Payload or metadata could not be encoded or decoded
    #[display("Encoding error: {}", _0)]
    Encoding(String),
    /// Remote object gateway reported an error
    #[display("Remote storage error: {}", _0)]
    Remote(String),
    /// Storage tier is not configured or not reachable
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use folio_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::BlobNotFound("42".to_string()));
/// assert!(format!("{}", err).contains("Blob not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Usage snapshot attached to an exhaustion error.
    pub fn usage(&self) -> Option<&UsageReport> {
        match &self.kind {
            StorageErrorKind::Exhausted(usage) => Some(usage),
            _ => None,
        }
    }

    /// Whether this error means a tier (or every tier) ran out of room.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self.kind,
            StorageErrorKind::Exhausted(_) | StorageErrorKind::TierRejected { .. }
        )
    }
}
