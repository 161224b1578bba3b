//! Inline `data:` URLs for images that have not been uploaded yet

use crate::error::{DiaryError, Result};
use base64::prelude::*;
use std::path::Path;

/// Decoded contents of a `data:<mime>;base64,<payload>` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        DataUrl {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parse a data URL. Only base64 payloads are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix("data:")
            .ok_or_else(|| DiaryError::InvalidDataUrl("missing 'data:' prefix".to_string()))?;

        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| DiaryError::InvalidDataUrl("missing ',' separator".to_string()))?;

        let mime = meta.strip_suffix(";base64").ok_or_else(|| {
            DiaryError::InvalidDataUrl("only base64-encoded data URLs are supported".to_string())
        })?;

        let bytes = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| DiaryError::InvalidDataUrl(format!("bad base64 payload: {}", e)))?;

        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };

        Ok(DataUrl::new(mime, bytes))
    }

    /// Encode back into `data:<mime>;base64,...`
    pub fn encode(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64_STANDARD.encode(&self.bytes))
    }

    /// File extension used when storing the decoded bytes
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/bmp" => "bmp",
            _ => "jpg",
        }
    }
}

pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:")
}

/// Guess an image MIME type from a file name
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
