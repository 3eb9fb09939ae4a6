//! `data:` URI codec used by the string-only tier.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Decode a base64 `data:` URI into its MIME type and bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "missing data: prefix".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "missing payload separator".to_string())?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| format!("unsupported data URI encoding: {}", header))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| format!("invalid base64 payload: {}", e))?;
    Ok((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_plain_text_payloads() {
        assert!(decode("data:text/plain,hello").is_err());
        assert!(decode("blob:folio/x").is_err());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let uri = encode("image/png", &[0x89, 0x50, 0x4e, 0x47]);
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, bytes) = decode(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }
}
