//! Tiered blob storage for the Folio hybrid media store.
//!
//! This crate provides the three storage tiers and the store that
//! orchestrates them:
//!
//! - [`FileSystemTier`]: binary-capable, ephemeral, large capacity
//! - [`KeyValueTier`]: string-only, ephemeral, small quota; also hosts the
//!   [`MetadataMirror`]
//! - [`RemoteTier`]: durable, network-bound, behind a [`RemoteObjectGateway`]
//!
//! [`TieredBlobStore`] writes new files to the first ephemeral tier that
//! accepts them and regenerates session-scoped handles through the
//! [`HandleRegistry`] on every `list`/`get`.
//!
//! # Example
//!
//! ```no_run
//! use folio_storage::{StorageConfig, TieredBlobStore};
//!
//! # async fn example() -> folio_error::FolioResult<()> {
//! let store = TieredBlobStore::from_config(StorageConfig::default());
//! let descriptor = store
//!     .put(b"fake png".to_vec(), "logo.png", "contents/images/2026/10/18/")
//!     .await?;
//! assert!(descriptor.display_url().is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binary;
mod config;
pub mod data_uri;
mod kv;
mod lifecycle;
mod memory_gateway;
mod remote;
mod store;
mod tier;

pub use binary::FileSystemTier;
pub use config::StorageConfig;
pub use kv::{KeyValueBackend, KeyValueTier, MemoryKeyValueStore, MetadataMirror};
pub use lifecycle::{HANDLE_PREFIX, HandleRegistry, LiveBlob};
pub use memory_gateway::InMemoryObjectGateway;
pub use remote::{
    RemoteObject, RemoteObjectGateway, RemoteObjectInfo, RemoteTier, UrlPurpose,
    descriptor_from_listing, object_key_for, remote_id_for_key,
};
pub use store::TieredBlobStore;
pub use tier::BlobTier;
