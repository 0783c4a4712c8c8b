//! Image sources
//!
//! Images come either as a URL typed by the operator or as a local file
//! they picked. Files are embedded in the document as `data:` URLs.
//!
//! Embedded files are scaled down to [`MAX_EMBED_WIDTH`] pixels wide and
//! re-encoded as JPEG at [`EMBED_JPEG_QUALITY`]. Files that cannot be
//! decoded (SVG, for one) are embedded as they are.

use crate::admin::error::{EditError, EditResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Largest file accepted for embedding
pub const MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Embedded images wider than this are scaled down
pub const MAX_EMBED_WIDTH: u32 = 1200;

/// JPEG quality used when re-encoding embedded images
pub const EMBED_JPEG_QUALITY: u8 = 70;

/// Where an image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    File(PathBuf),
}

impl ImageSource {
    /// Pick the source from optional form inputs; a chosen file wins.
    ///
    /// `field` names the input in the error when both are empty.
    pub fn from_inputs(
        url: Option<&str>,
        file: Option<&Path>,
        field: &'static str,
    ) -> EditResult<Self> {
        if let Some(file) = file {
            return Ok(ImageSource::File(file.to_path_buf()));
        }
        match url.map(str::trim) {
            Some(url) if !url.is_empty() => Ok(ImageSource::Url(url.to_string())),
            _ => Err(EditError::MissingField(field)),
        }
    }

    /// Turn the source into a URL that can be stored in the document
    pub async fn resolve(&self) -> EditResult<String> {
        match self {
            ImageSource::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(EditError::MissingField("image"));
                }
                Ok(url.to_string())
            }
            ImageSource::File(path) => file_to_data_url(path).await,
        }
    }
}

/// MIME type for the image extensions we embed
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// Encode raw image bytes as a `data:` URL
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

async fn file_to_data_url(path: &Path) -> EditResult<String> {
    let mime = mime_for(path).ok_or_else(|| {
        EditError::Media(format!("unsupported image type: {}", path.display()))
    })?;

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| EditError::Media(format!("{}: {e}", path.display())))?;
    if meta.len() > MAX_IMAGE_BYTES {
        return Err(EditError::Media(format!(
            "{} is {} bytes, limit is {MAX_IMAGE_BYTES}",
            path.display(),
            meta.len()
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| EditError::Media(format!("{}: {e}", path.display())))?;

    let original_len = bytes.len();
    let (bytes, compressed) = tokio::task::spawn_blocking(move || match compress_image(&bytes) {
        Ok(jpeg) => (jpeg, true),
        Err(e) => {
            tracing::debug!("Embedding image without compression: {e}");
            (bytes, false)
        }
    })
    .await
    .map_err(|e| EditError::Media(format!("image task failed: {e}")))?;

    let mime = if compressed { "image/jpeg" } else { mime };
    tracing::debug!(
        path = %path.display(),
        original_len,
        bytes = bytes.len(),
        compressed,
        "Embedded image file"
    );
    Ok(data_url(mime, &bytes))
}

/// Decode an image, scale it to at most [`MAX_EMBED_WIDTH`] wide keeping
/// the aspect ratio, and re-encode it as JPEG.
pub fn compress_image(bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let mut img = image::load_from_memory(bytes)?;

    if img.width() > MAX_EMBED_WIDTH {
        let height = (u64::from(img.height()) * u64::from(MAX_EMBED_WIDTH)
            / u64::from(img.width()))
        .max(1) as u32;
        img = img.resize_exact(MAX_EMBED_WIDTH, height, FilterType::Triangle);
    }

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, EMBED_JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}
