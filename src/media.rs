//! Embedded media handling.
//!
//! Media payloads are retained base64-encoded; the raw bytes are dropped as
//! soon as the record is built. Encoding runs over fixed-size input blocks
//! so no intermediate buffer ever holds a second copy of the payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Media category derived from the payload's mime prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Unknown,
}

/// An embedded media payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Original filename or a synthesized `image_{n}.{ext}` name.
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Byte length of the decoded content.
    pub size: usize,
    /// Lowercased file extension.
    pub extension: String,
    /// Base64-encoded content; absent for zero-length payloads and for
    /// slide-local picture references whose bytes live in the global
    /// media list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Media {
    /// Build a media record from raw payload bytes.
    pub fn from_bytes(name: &str, extension: &str, bytes: &[u8]) -> Self {
        let extension = extension.to_ascii_lowercase();
        Self {
            name: name.to_string(),
            media_type: media_type_for_extension(&extension),
            size: bytes.len(),
            data: if bytes.is_empty() {
                None
            } else {
                Some(encode_base64(bytes))
            },
            extension,
        }
    }

    /// Build a media record for an OfficeArt blip payload.
    ///
    /// Blips are images by definition, whatever their extension, so the
    /// category is fixed rather than inferred (metafile extensions like
    /// `emf` are not in the package-media image set).
    pub fn blip(name: &str, extension: &str, bytes: &[u8]) -> Self {
        Self {
            media_type: MediaType::Image,
            ..Self::from_bytes(name, extension, bytes)
        }
    }

    /// Build a zero-byte placeholder reference, used for slide-local
    /// pictures whose payload is resolved from the package media list.
    pub fn reference(name: &str, extension: &str) -> Self {
        Self {
            name: name.to_string(),
            media_type: MediaType::Image,
            size: 0,
            extension: extension.to_ascii_lowercase(),
            data: None,
        }
    }
}

/// Classify a package-media file extension into a media category.
pub fn media_type_for_extension(extension: &str) -> MediaType {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "webp" => MediaType::Image,
        "mp4" | "avi" | "mov" | "wmv" | "webm" => MediaType::Video,
        "mp3" | "wav" | "ogg" | "wma" | "m4a" => MediaType::Audio,
        _ => MediaType::Unknown,
    }
}

/// Input block size for chunked base64 encoding.
///
/// Must stay a multiple of 3 so block boundaries never produce padding.
const BASE64_BLOCK: usize = 3 * 1024;

/// Base64-encode a payload in fixed-size blocks.
pub fn encode_base64(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for block in bytes.chunks(BASE64_BLOCK) {
        STANDARD.encode_string(block, &mut out);
    }
    out
}
