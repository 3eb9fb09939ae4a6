//! Content resolution.

use crate::{HandleRecovery, MatchStrategy, MediaTag, TagParser, find_match, render};
use folio_core::FileDescriptor;
use folio_error::FolioResult;
use std::sync::Arc;
use uuid::Uuid;

/// Why a tag could not be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ReferenceFailure {
    /// No file matched the requested name
    #[display("reference unresolved")]
    Unresolved,
    /// A file matched but no usable URL exists, even after recovery
    #[display("reference broken")]
    Broken,
}

/// How a single tag was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The tag became an embed
    Embedded {
        /// File the embed points at; after recovery this may differ from
        /// the matched descriptor when only a same-named record survived
        id: Uuid,
        /// Cascade step that matched
        strategy: MatchStrategy,
        /// URL placed in the embed
        url: String,
        /// Whether the URL came from recovery
        recovered: bool,
    },
    /// The tag became a failure marker
    Failed {
        /// Failure class
        failure: ReferenceFailure,
        /// Matched file, for broken references
        id: Option<Uuid>,
    },
}

/// Resolution of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
    /// The tag as found in content
    pub tag: MediaTag,
    /// What it became
    pub resolution: Resolution,
}

impl TagOutcome {
    /// Id of the matched file, if any.
    pub fn matched_id(&self) -> Option<Uuid> {
        match &self.resolution {
            Resolution::Embedded { id, .. } => Some(*id),
            Resolution::Failed { id, .. } => *id,
        }
    }

    /// Failure class, if the tag was not embedded.
    pub fn failure(&self) -> Option<ReferenceFailure> {
        match &self.resolution {
            Resolution::Embedded { .. } => None,
            Resolution::Failed { failure, .. } => Some(*failure),
        }
    }
}

/// Resolved text plus per-tag detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    /// Content with every tag replaced
    pub text: String,
    /// One entry per tag, in order of appearance
    pub outcomes: Vec<TagOutcome>,
}

/// Rewrites `[image:..]`, `[video:..]` and `[media:..]` tags into embeds.
///
/// Resolution never fails: tags that cannot be embedded become visible
/// markers naming the file.
#[derive(Clone)]
pub struct MediaResolver {
    parser: TagParser,
    recovery: Option<Arc<dyn HandleRecovery>>,
}

impl std::fmt::Debug for MediaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaResolver")
            .field("recovery", &self.recovery.is_some())
            .finish()
    }
}

impl MediaResolver {
    /// Resolver with no recovery source.
    pub fn new() -> FolioResult<Self> {
        Ok(Self {
            parser: TagParser::new()?,
            recovery: None,
        })
    }

    /// Consult `recovery` when a matched file's URL is empty or dead.
    pub fn with_recovery(mut self, recovery: Arc<dyn HandleRecovery>) -> Self {
        self.recovery = Some(recovery);
        self
    }

    /// Replace every tag in `content` using `descriptors`.
    pub async fn resolve(&self, content: &str, descriptors: &[FileDescriptor]) -> String {
        self.resolve_detailed(content, descriptors).await.text
    }

    /// Like [`resolve`](Self::resolve), also reporting how each tag resolved.
    #[tracing::instrument(skip(self, content, descriptors), fields(candidates = descriptors.len()))]
    pub async fn resolve_detailed(
        &self,
        content: &str,
        descriptors: &[FileDescriptor],
    ) -> ResolvedContent {
        let tags = self.parser.parse(content);
        let mut text = String::with_capacity(content.len());
        let mut outcomes = Vec::with_capacity(tags.len());
        let mut cursor = 0;

        for tag in tags {
            text.push_str(&content[cursor..tag.span_start]);
            let (replacement, resolution) = self.resolve_tag(&tag, descriptors).await;
            text.push_str(&replacement);
            cursor = tag.span_end;
            outcomes.push(TagOutcome { tag, resolution });
        }
        text.push_str(&content[cursor..]);

        let failed = outcomes.iter().filter(|o| o.failure().is_some()).count();
        tracing::debug!(tags = outcomes.len(), failed, "Resolved content");
        ResolvedContent { text, outcomes }
    }

    async fn resolve_tag(
        &self,
        tag: &MediaTag,
        descriptors: &[FileDescriptor],
    ) -> (String, Resolution) {
        let Some((descriptor, strategy)) = find_match(&tag.requested_name, descriptors) else {
            tracing::debug!(name = %tag.requested_name, "No file matches tag");
            return (
                render::not_found(&tag.requested_name),
                Resolution::Failed {
                    failure: ReferenceFailure::Unresolved,
                    id: None,
                },
            );
        };

        if let Some(url) = descriptor
            .display_url()
            .filter(|url| self.recovery.as_ref().is_none_or(|r| r.is_live(url)))
        {
            return (
                render::embed(tag.kind, descriptor, url),
                Resolution::Embedded {
                    id: descriptor.id,
                    strategy,
                    url: url.to_string(),
                    recovered: false,
                },
            );
        }

        let recovered = match &self.recovery {
            Some(recovery) => recovery.recover(descriptor).await,
            None => None,
        };
        let usable = recovered.and_then(|d| {
            let url = d.display_url()?.to_string();
            Some((d, url))
        });

        match usable {
            Some((found, url)) => {
                if found.id == descriptor.id {
                    tracing::info!(id = %found.id, "Recovered URL for matched file");
                } else {
                    tracing::info!(
                        matched = %descriptor.id,
                        recovered = %found.id,
                        name = %found.name,
                        "Recovered URL from another file with the same name"
                    );
                }
                (
                    render::embed(tag.kind, &found, &url),
                    Resolution::Embedded {
                        id: found.id,
                        strategy,
                        url,
                        recovered: true,
                    },
                )
            }
            None => {
                tracing::warn!(id = %descriptor.id, name = %descriptor.name, "Matched file has no usable URL");
                (
                    render::reupload_required(&tag.requested_name, descriptor),
                    Resolution::Failed {
                        failure: ReferenceFailure::Broken,
                        id: Some(descriptor.id),
                    },
                )
            }
        }
    }
}
