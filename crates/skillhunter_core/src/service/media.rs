//! Image upload encoding.
//!
//! Uploaded photos are stored inline in the document as data URLs; the
//! document treats them as opaque strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

/// Encodes `bytes` as a `data:` URL with the given MIME type.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Guesses an image MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_data_url, mime_for_path};
    use std::path::Path;

    #[test]
    fn data_url_is_base64_encoded() {
        assert_eq!(encode_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("me.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("collage.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }
}
