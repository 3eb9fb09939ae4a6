//! Media reference resolution for the Folio hybrid media store.
//!
//! Content refers to uploaded files by name with `[image:name]`,
//! `[video:name]` and `[media:name]` tags. [`MediaResolver`] binds each tag to
//! a file through an ordered matching cascade and rewrites it into an HTML
//! embed, or into a visible marker when the file is missing or unusable.
//!
//! # Example
//!
//! ```
//! use folio_core::{FileDescriptor, StorageTier};
//! use folio_resolver::MediaResolver;
//!
//! # async fn example() -> folio_error::FolioResult<()> {
//! let mut logo = FileDescriptor::new("logo.png", "contents/images/", 4, StorageTier::EphemeralKv);
//! logo.handle = "blob:folio/session/nonce".to_string();
//!
//! let resolver = MediaResolver::new()?;
//! let html = resolver.resolve("Our [image:logo.png]", &[logo]).await;
//! assert!(html.starts_with("Our <img src=\"blob:folio/session/nonce\""));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cascade;
mod recovery;
pub mod render;
mod resolver;
mod tag;

pub use cascade::{MatchStrategy, find_match};
pub use recovery::HandleRecovery;
pub use resolver::{MediaResolver, ReferenceFailure, Resolution, ResolvedContent, TagOutcome};
pub use tag::{MediaTag, TagKind, TagParser};
