//! File naming rules: validation, safe names, MIME inference and logical paths.

use crate::MediaType;
use chrono::{Datelike, NaiveDate};

/// Largest payload accepted for ingestion unless configured otherwise (500 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 500 * 1024 * 1024;

const MAX_SAFE_NAME_LEN: usize = 100;

/// Extension of a filename without the leading dot, or `""` when absent.
pub fn extension_of(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// Filename with its final extension stripped.
///
/// ```
/// assert_eq!(folio_core::stem_of("diagram.png"), "diagram");
/// assert_eq!(folio_core::stem_of("archive.tar.gz"), "archive.tar");
/// assert_eq!(folio_core::stem_of("README"), "README");
/// ```
pub fn stem_of(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Filename up to its first dot, so every extension is dropped.
///
/// Names with a leading dot are returned whole.
///
/// ```
/// assert_eq!(folio_core::base_name_of("photo.final.png"), "photo");
/// assert_eq!(folio_core::base_name_of("archive.tar.gz"), "archive");
/// assert_eq!(folio_core::base_name_of(".env"), ".env");
/// ```
pub fn base_name_of(name: &str) -> &str {
    match name.split_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => name,
    }
}

/// Infer a MIME type from a filename extension.
pub fn mime_type_for_name(name: &str) -> &'static str {
    match extension_of(name).to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Check that a file may be ingested.
///
/// # Errors
///
/// Returns a description of the first violated rule: empty name, a name
/// containing path or shell metacharacters, or a payload above `max_bytes`.
pub fn validate_file(name: &str, size_bytes: u64, max_bytes: u64) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("File name is empty".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|&c| matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control())
    {
        return Err(format!("File name contains forbidden character {:?}: {}", c, name));
    }
    if size_bytes > max_bytes {
        return Err(format!(
            "File {} is {} bytes, above the {} byte limit",
            name, size_bytes, max_bytes
        ));
    }
    Ok(())
}

/// Reduce a filename to characters that are safe in object keys.
///
/// Characters outside `[A-Za-z0-9._-]` (Hangul syllables are kept) become
/// `_`, runs of `_` collapse, and names longer than 100 characters are
/// truncated with their extension preserved.
///
/// ```
/// assert_eq!(folio_core::safe_file_name("my photo (1).png"), "my_photo_1_.png");
/// ```
pub fn safe_file_name(original: &str) -> String {
    let mut safe = String::with_capacity(original.len());
    for c in original.chars() {
        let keep = c.is_ascii_alphanumeric()
            || matches!(c, '.' | '-' | '_')
            || ('\u{AC00}'..='\u{D7A3}').contains(&c);
        let c = if keep { c } else { '_' };
        if c == '_' && safe.ends_with('_') {
            continue;
        }
        safe.push(c);
    }

    if safe.chars().count() <= MAX_SAFE_NAME_LEN {
        return safe;
    }

    // Leave room for at least one stem character and the dot.
    let ext: String = extension_of(&safe)
        .chars()
        .take(MAX_SAFE_NAME_LEN - 2)
        .collect();
    let stem: String = stem_of(&safe)
        .chars()
        .take(MAX_SAFE_NAME_LEN - ext.chars().count() - usize::from(!ext.is_empty()))
        .collect();
    if ext.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// Classification path of the form `contents/<folder>/YYYY/MM/DD/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{}", _0)]
pub struct LogicalPath(String);

impl LogicalPath {
    /// Build the logical path for a file ingested on `date`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use folio_core::LogicalPath;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    /// assert_eq!(LogicalPath::for_file("clip.MP4", date).as_str(), "contents/videos/2024/03/09/");
    /// ```
    pub fn for_file(name: &str, date: NaiveDate) -> Self {
        let folder = MediaType::from_extension(extension_of(name))
            .unwrap_or(MediaType::Document)
            .folder();
        Self(format!(
            "contents/{}/{:04}/{:02}/{:02}/",
            folder,
            date.year(),
            date.month(),
            date.day()
        ))
    }

    /// Borrow the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the path, returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dangerous_names() {
        assert!(validate_file("a/b.png", 1, 10).is_err());
        assert!(validate_file("what?.png", 1, 10).is_err());
        assert!(validate_file("  ", 1, 10).is_err());
        assert!(validate_file("ok.png", 11, 10).is_err());
        assert!(validate_file("ok.png", 10, 10).is_ok());
    }

    #[test]
    fn safe_name_truncates_and_keeps_extension() {
        let long = format!("{}.jpeg", "x".repeat(150));
        let safe = safe_file_name(&long);
        assert_eq!(safe.chars().count(), 100);
        assert!(safe.ends_with(".jpeg"));
    }

    #[test]
    fn safe_name_caps_oversized_extension() {
        let long = format!("clip.{}", "e".repeat(120));
        let safe = safe_file_name(&long);
        assert_eq!(safe.chars().count(), 100);
        assert!(safe.starts_with("c."));

        let no_ext = "n".repeat(130);
        assert_eq!(safe_file_name(&no_ext).chars().count(), 100);
    }

    #[test]
    fn base_name_drops_every_extension() {
        assert_eq!(base_name_of("photo.final.png"), "photo");
        assert_eq!(base_name_of("README"), "README");
        assert_eq!(stem_of("photo.final.png"), "photo.final");
    }

    #[test]
    fn safe_name_keeps_hangul() {
        assert_eq!(safe_file_name("사진 1.png"), "사진_1.png");
    }

    #[test]
    fn hidden_files_have_no_extension() {
        assert_eq!(extension_of(".env"), "");
        assert_eq!(stem_of(".env"), ".env");
    }
}
