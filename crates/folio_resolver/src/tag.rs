//! Symbolic media tags inside content text.

use folio_error::{ConfigError, ConfigErrorKind, FolioResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind named in a `[kind:name]` tag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TagKind {
    /// `[image:name]`
    #[display("image")]
    Image,
    /// `[video:name]`
    #[display("video")]
    Video,
    /// `[media:name]`, embedded by the matched file's type
    #[display("media")]
    Media,
}

/// One occurrence of a tag in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTag {
    /// Tag kind
    pub kind: TagKind,
    /// Exact matched text, brackets included
    pub raw_match: String,
    /// Name inside the tag, trimmed
    pub requested_name: String,
    /// Byte offset of the opening bracket
    pub span_start: usize,
    /// Byte offset one past the closing bracket
    pub span_end: usize,
}

/// Finds media tags in content.
#[derive(Debug, Clone)]
pub struct TagParser {
    pattern: Regex,
}

impl TagParser {
    /// Compile the tag pattern.
    pub fn new() -> FolioResult<Self> {
        let pattern = Regex::new(r"\[(image|video|media):([^\]]+)\]")
            .map_err(|e| ConfigError::new(ConfigErrorKind::Pattern(format!("media tag: {}", e))))?;
        Ok(Self { pattern })
    }

    /// Every tag in `content`, in order of appearance.
    pub fn parse(&self, content: &str) -> Vec<MediaTag> {
        self.pattern
            .captures_iter(content)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let kind = cap.get(1)?.as_str().parse().ok()?;
                Some(MediaTag {
                    kind,
                    raw_match: whole.as_str().to_string(),
                    requested_name: cap.get(2)?.as_str().trim().to_string(),
                    span_start: whole.start(),
                    span_end: whole.end(),
                })
            })
            .collect()
    }
}
