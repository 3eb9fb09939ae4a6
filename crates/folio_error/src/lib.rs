//! Error types for the Folio hybrid media store.
//!
//! This crate provides the foundation error types used throughout the Folio workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Reference resolution failures are deliberately absent: the resolver encodes
//! them into rendered content instead of returning them.
//!
//! # Examples
//!
//! ```
//! use folio_error::{FolioResult, StorageError, StorageErrorKind};
//!
//! fn load(id: &str) -> FolioResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::BlobNotFound(id.to_string())))?
//! }
//!
//! assert!(load("missing").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gateway;
mod storage;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{FolioError, FolioErrorKind, FolioResult};
pub use gateway::{GatewayError, GatewayErrorKind};
pub use storage::{StorageError, StorageErrorKind};
