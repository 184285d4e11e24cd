//! Base64 image detection for free-text questionnaire answers.
//!
//! An answer counts as an image when it decodes as standard base64 (bare or
//! inside a `data:image/*;base64,` URL) and the decoded bytes start with a
//! PNG, JPEG, GIF or WebP signature.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Parse an allow-list entry. `jpg` is accepted for JPEG.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded image answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Bytes,
    pub format: ImageFormat,
}

impl DecodedImage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode `text` as a base64 image, or `None` when it is anything else.
#[must_use]
pub fn decode_image(text: &str) -> Option<DecodedImage> {
    let text = text.trim();
    let payload = match text.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',')?;
            if !header.starts_with("image/") || !header.ends_with(";base64") {
                return None;
            }
            data
        }
        None => text,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    let bytes = STANDARD.decode(cleaned.as_bytes()).ok()?;
    let format = ImageFormat::sniff(&bytes)?;
    Some(DecodedImage {
        bytes: Bytes::from(bytes),
        format,
    })
}

/// Parse a `file_format` rule value. `None` or blank allows every format.
#[must_use]
pub fn allowed_formats(rule: Option<&str>) -> Vec<ImageFormat> {
    rule.map(|value| {
        value
            .split(',')
            .filter_map(ImageFormat::parse)
            .collect()
    })
    .unwrap_or_default()
}
