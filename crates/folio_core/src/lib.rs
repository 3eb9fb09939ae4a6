//! Core data types for the Folio hybrid media store.
//!
//! This crate provides the data model shared by every Folio crate: the
//! [`FileDescriptor`] that identifies an uploaded file regardless of which
//! storage tier holds its bytes, the [`StorageTier`] enumeration, media type
//! classification, usage snapshots, and the naming rules applied to files
//! before they are stored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod descriptor;
mod media_type;
mod naming;
mod usage;

pub use descriptor::{FileDescriptor, StorageTier};
pub use media_type::MediaType;
pub use naming::{
    base_name_of, extension_of, mime_type_for_name, safe_file_name, stem_of, validate_file,
    LogicalPath, DEFAULT_MAX_FILE_BYTES,
};
pub use usage::{format_file_size, FileUsage, UsageReport};
