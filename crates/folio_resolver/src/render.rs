//! HTML for embeds and failure markers.

use crate::TagKind;
use folio_core::{FileDescriptor, MediaType};

/// CSS class shared by every failure marker.
pub const MISSING_CLASS: &str = "folio-media-missing";

/// Escape text for HTML content and attributes.
///
/// Square brackets are escaped too, so rendered output never contains
/// anything that parses as a media tag again.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '[' => out.push_str("&#91;"),
            ']' => out.push_str("&#93;"),
            _ => out.push(c),
        }
    }
    out
}

/// Embed `descriptor` at `url` in the shape `kind` asks for.
///
/// `media` tags follow the file's own type; anything neither image, video nor
/// audio becomes a link.
pub fn embed(kind: TagKind, descriptor: &FileDescriptor, url: &str) -> String {
    let shape = match kind {
        TagKind::Image => MediaType::Image,
        TagKind::Video => MediaType::Video,
        TagKind::Media => descriptor.media_type(),
    };
    let src = escape(url);
    let id = descriptor.id;
    let name = escape(&descriptor.name);
    match shape {
        MediaType::Image => format!(r#"<img src="{src}" alt="{name}" data-folio-id="{id}">"#),
        MediaType::Video => {
            format!(r#"<video src="{src}" controls data-folio-id="{id}"></video>"#)
        }
        MediaType::Audio => {
            format!(r#"<audio src="{src}" controls data-folio-id="{id}"></audio>"#)
        }
        MediaType::Document => {
            format!(r#"<a href="{src}" data-folio-id="{id}">{name}</a>"#)
        }
    }
}

/// Marker for a tag that matched no file.
pub fn not_found(requested_name: &str) -> String {
    let name = escape(requested_name);
    format!(
        r#"<div class="{MISSING_CLASS}" data-folio-status="not-found" data-folio-name="{name}">file not found: {name}</div>"#
    )
}

/// Marker for a matched file with no usable URL.
pub fn reupload_required(requested_name: &str, descriptor: &FileDescriptor) -> String {
    let name = escape(requested_name);
    let id = descriptor.id;
    format!(
        r#"<div class="{MISSING_CLASS}" data-folio-status="reupload-required" data-folio-id="{id}" data-folio-name="{name}">media unavailable, re-upload required: {name}</div>"#
    )
}
