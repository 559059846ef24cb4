use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use thiserror::Error;

use crate::model::UploadedImage;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("file of type `{0}` is not an image")]
    NotAnImage(String),

    #[error("image is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Validates an uploaded file and encodes it for transport.
///
/// A declared media type must start with `image/`. When the client sent no
/// usable type the bytes are sniffed instead.
pub fn accept_upload(
    bytes: &[u8],
    declared_mime: Option<&str>,
    max_bytes: usize,
) -> Result<UploadedImage, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let mime_type = match declared_mime.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) if mime.eq_ignore_ascii_case("application/octet-stream") => sniff(bytes)?,
        Some(mime) if mime.to_ascii_lowercase().starts_with("image/") => mime.to_ascii_lowercase(),
        Some(mime) => return Err(UploadError::NotAnImage(mime.to_string())),
        None => sniff(bytes)?,
    };

    let base64 = general_purpose::STANDARD.encode(bytes);
    let preview_url = format!("data:{mime_type};base64,{base64}");

    Ok(UploadedImage {
        base64,
        mime_type,
        preview_url,
    })
}

fn sniff(bytes: &[u8]) -> Result<String, UploadError> {
    let format = image::guess_format(bytes)
        .map_err(|_| UploadError::NotAnImage("unknown".to_string()))?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        other => return Err(UploadError::NotAnImage(format!("{other:?}"))),
    };
    Ok(mime.to_string())
}
