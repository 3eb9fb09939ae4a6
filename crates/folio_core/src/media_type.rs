//! Media type classification.

use serde::{Deserialize, Serialize};

/// Broad class of a stored file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Image content (PNG, JPEG, WebP, etc.)
    #[display("image")]
    Image,
    /// Audio content (MP3, WAV, OGG, etc.)
    #[display("audio")]
    Audio,
    /// Video content (MP4, WebM, MOV, etc.)
    #[display("video")]
    Video,
    /// Anything else (PDF, text, office documents)
    #[display("document")]
    Document,
}

impl MediaType {
    /// Convert to string representation for metadata storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Document => "document",
        }
    }

    /// Classify a MIME type by its top-level type.
    ///
    /// Returns `None` for types that say nothing useful, such as
    /// `application/octet-stream` or an empty string.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim().to_ascii_lowercase();
        match top.as_str() {
            "image" => Some(MediaType::Image),
            "audio" => Some(MediaType::Audio),
            "video" => Some(MediaType::Video),
            "text" => Some(MediaType::Document),
            "application" if mime != "application/octet-stream" => Some(MediaType::Document),
            _ => None,
        }
    }

    /// Classify a file extension (without the leading dot, any case).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "avif" => {
                Some(MediaType::Image)
            }
            "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" | "mkv" | "m4v" => {
                Some(MediaType::Video)
            }
            "mp3" | "wav" | "ogg" | "m4a" | "flac" | "aac" => Some(MediaType::Audio),
            "pdf" | "txt" | "md" | "doc" | "docx" | "csv" | "json" => Some(MediaType::Document),
            _ => None,
        }
    }

    /// Folder segment used when building logical paths.
    pub fn folder(&self) -> &'static str {
        match self {
            MediaType::Image => "images",
            MediaType::Video => "videos",
            MediaType::Audio | MediaType::Document => "documents",
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "audio" => Ok(MediaType::Audio),
            "video" => Ok(MediaType::Video),
            "document" => Ok(MediaType::Document),
            _ => Err(format!("Unknown media type: {}", s)),
        }
    }
}
