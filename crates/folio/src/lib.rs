//! Folio: a hybrid client-side media store.
//!
//! Uploaded files land in the most capable ephemeral tier available, are
//! mirrored into a small key/value index, and can be promoted to a durable
//! remote bucket. Content refers to files by name with `[image:..]`,
//! `[video:..]` and `[media:..]` tags, resolved at render time into embeds
//! with freshly minted URLs.
//!
//! # Crates
//!
//! - [`folio_core`]: descriptors, tiers, naming rules
//! - [`folio_error`]: error taxonomy
//! - [`folio_storage`]: tiers, handle lifecycle, tiered store
//! - [`folio_gateway`]: signed URL minting for remote files
//! - [`folio_resolver`]: tag parsing, matching and rendering

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod library;
mod observability;

pub use config::FolioConfig;
pub use library::MediaLibrary;
pub use observability::{ObservabilityConfig, init_observability};

pub use folio_core::{
    FileDescriptor, FileUsage, LogicalPath, MediaType, StorageTier, UsageReport, format_file_size,
};
pub use folio_error::{
    ConfigError, ConfigErrorKind, FolioError, FolioErrorKind, FolioResult, GatewayError,
    GatewayErrorKind, StorageError, StorageErrorKind,
};
pub use folio_gateway::{GatewayConfig, SecureAccessGateway};
pub use folio_resolver::{
    HandleRecovery, MatchStrategy, MediaResolver, MediaTag, ReferenceFailure, Resolution,
    ResolvedContent, TagKind, TagOutcome,
};
pub use folio_storage::{
    BlobTier, FileSystemTier, HandleRegistry, InMemoryObjectGateway, KeyValueBackend,
    MemoryKeyValueStore, RemoteObjectGateway, StorageConfig, TieredBlobStore, UrlPurpose,
};
