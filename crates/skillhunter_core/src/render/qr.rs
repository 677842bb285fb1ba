//! Remote QR image URL for the project link on the cover and map pages.
//!
//! The image itself is produced by a third-party service; nothing in core
//! depends on it being reachable.

use crate::model::document::Section;
use serde_json::Value;

const QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
/// Image size used on the cover page.
pub const COVER_QR_SIZE: u32 = 120;
/// Image size used next to the region map.
pub const MAP_QR_SIZE: u32 = 110;

/// Builds the QR image URL for `project_url`, or `None` for a blank link.
pub fn qr_image_url(project_url: &str, size: u32) -> Option<String> {
    let trimmed = project_url.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(
        "{QR_SERVICE_URL}?size={size}x{size}&data={}",
        encode_uri_component(trimmed)
    ))
}

/// Reads `cover.projectUrl` and `cover.showQR` from the document.
pub fn cover_qr_url(doc: &Value, size: u32) -> Option<String> {
    let cover = doc.get(Section::Cover.as_key())?;
    let show = cover.get("showQR").and_then(Value::as_bool).unwrap_or(false);
    if !show {
        return None;
    }
    let url = cover.get("projectUrl").and_then(Value::as_str)?;
    qr_image_url(url, size)
}

// Same unreserved set as ECMAScript encodeURIComponent.
fn encode_uri_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
