//! Decoding of uploaded post images.
//!
//! Clients send images as base64, optionally wrapped in a `data:` URI. The
//! payload must decode to a complete image in one of the enabled formats.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use yatube_common::{AppError, AppResult};

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// A validated image ready to be stored.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Detected format.
    pub format: ImageFormat,
}

impl DecodedImage {
    /// File extension for the detected format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }

    /// MIME type for the detected format.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Decode and verify an uploaded image.
pub fn decode_upload(raw: &str, max_bytes: usize) -> AppResult<DecodedImage> {
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or_else(invalid)?;
            if !header.ends_with(";base64") {
                return Err(invalid());
            }
            data
        }
        None => raw,
    };
    let payload = payload.trim();

    // Reject oversized payloads before decoding them.
    if payload.len() / 4 * 3 > max_bytes + 2 {
        return Err(too_large(max_bytes));
    }

    let bytes = STANDARD.decode(payload).map_err(|_| invalid())?;
    if bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    let format = image::guess_format(&bytes).map_err(|_| invalid())?;
    image::load_from_memory_with_format(&bytes, format).map_err(|e| {
        tracing::debug!(error = %e, "Rejected image upload");
        invalid()
    })?;

    Ok(DecodedImage { bytes, format })
}

fn invalid() -> AppError {
    AppError::field("image", INVALID_IMAGE)
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::field(
        "image",
        format!("Ensure the image is no larger than {max_bytes} bytes."),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// A 2x2 PNG as base64.
    pub(crate) fn png_base64() -> String {
        let img = image::RgbImage::new(2, 2);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        STANDARD.encode(buf)
    }

    #[test]
    fn test_decode_data_uri() {
        let raw = format!("data:image/png;base64,{}", png_base64());
        let decoded = decode_upload(&raw, 1024 * 1024).unwrap();

        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.extension(), "png");
        assert_eq!(decoded.content_type(), "image/png");
    }

    #[test]
    fn test_decode_bare_base64() {
        assert!(decode_upload(&png_base64(), 1024 * 1024).is_ok());
    }

    #[test]
    fn test_rejects_non_image() {
        let raw = format!("data:text/plain;base64,{}", STANDARD.encode("hello world"));
        assert!(matches!(
            decode_upload(&raw, 1024),
            Err(AppError::InvalidField { field: "image", .. })
        ));
        assert!(decode_upload("data:image/png,not-base64", 1024).is_err());
        assert!(decode_upload("!!!", 1024).is_err());
    }

    #[test]
    fn test_rejects_truncated_image() {
        let bytes = STANDARD.decode(png_base64()).unwrap();
        let truncated = STANDARD.encode(&bytes[..bytes.len() / 2]);
        assert!(decode_upload(&truncated, 1024 * 1024).is_err());
    }

    #[test]
    fn test_rejects_oversized_image() {
        let result = decode_upload(&png_base64(), 8);
        assert!(matches!(
            result,
            Err(AppError::InvalidField { ref message, .. }) if message.contains("no larger than 8")
        ));
    }
}
