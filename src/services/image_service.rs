//! Image Service - validates uploaded cover images and stores them under the
//! uploads directory, recompressing oversized ones to JPEG.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use serde::Serialize;

use crate::domain::DomainError;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// When and how hard oversized images are recompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionPolicy {
    pub budget_bytes: usize,
    pub start_quality: u8,
    pub quality_step: u8,
    pub min_quality: u8,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            budget_bytes: 500 * 1024,
            start_quality: 90,
            quality_step: 10,
            min_quality: 30,
        }
    }
}

impl CompressionPolicy {
    /// JPEG qualities to try, highest first, ending at the floor.
    pub fn qualities(&self) -> impl Iterator<Item = u8> {
        let min = self.min_quality.clamp(1, 100);
        let start = self.start_quality.clamp(min, 100);
        let step = self.quality_step.max(1);

        std::iter::successors(Some(start), move |q| {
            if *q == min {
                None
            } else {
                Some(q.saturating_sub(step).max(min))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub quality: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub url: String,
    pub file_name: String,
    pub size: usize,
    /// JPEG quality used, `None` when stored as uploaded
    pub quality: Option<u8>,
}

/// File extension for an accepted image, from the declared type or,
/// failing that, from the bytes themselves.
pub fn image_extension(content_type: Option<&str>, data: &[u8]) -> Result<&'static str, DomainError> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .map(|ct| if ct == "image/jpg" { "image/jpeg".to_string() } else { ct });

    if let Some(declared) = &declared
        && let Some((_, ext)) = ALLOWED_TYPES.iter().find(|(mime, _)| *mime == declared.as_str())
    {
        return Ok(*ext);
    }

    let guessed = match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => Some("jpg"),
        Ok(image::ImageFormat::Png) => Some("png"),
        Ok(image::ImageFormat::WebP) => Some("webp"),
        Ok(image::ImageFormat::Gif) => Some("gif"),
        _ => None,
    };

    guessed.ok_or_else(|| {
        DomainError::Validation("Only JPEG, PNG, WebP and GIF images are accepted".to_string())
    })
}

/// Re-encodes `data` as JPEG, lowering the quality until the result fits
/// the budget or the quality floor is reached. CPU bound.
pub fn compress_to_budget(
    data: &[u8],
    policy: &CompressionPolicy,
) -> Result<Compressed, DomainError> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| DomainError::Validation(format!("Could not read image: {}", e)))?;
    let rgb = decoded.to_rgb8();

    let mut last = None;
    for quality in policy.qualities() {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .encode_image(&rgb)
            .map_err(|e| DomainError::Internal(format!("JPEG encoding failed: {}", e)))?;

        let fits = bytes.len() <= policy.budget_bytes;
        tracing::debug!("JPEG q{} -> {} bytes", quality, bytes.len());
        last = Some(Compressed { bytes, quality });
        if fits {
            break;
        }
    }

    last.ok_or_else(|| DomainError::Internal("No compression quality to try".to_string()))
}

fn unique_file_name(ext: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        &id[..8],
        ext
    )
}

/// Validates and stores an uploaded image, returning its public URL.
///
/// Images within budget are written byte for byte. The final bytes are
/// written to a temporary file and renamed into place, so a failed upload
/// leaves nothing behind.
pub async fn store_image(
    dir: &Path,
    data: Vec<u8>,
    content_type: Option<&str>,
    policy: &CompressionPolicy,
) -> Result<StoredImage, DomainError> {
    if data.is_empty() {
        return Err(DomainError::Validation("No image provided".to_string()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(DomainError::Validation(format!(
            "Image is larger than {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let ext = image_extension(content_type, &data)?;

    let (bytes, ext, quality) = if data.len() <= policy.budget_bytes {
        (data, ext, None)
    } else {
        let policy = *policy;
        let original_size = data.len();
        let compressed = tokio::task::spawn_blocking(move || compress_to_budget(&data, &policy))
            .await
            .map_err(|e| DomainError::Internal(format!("Compression task failed: {}", e)))??;
        tracing::info!(
            "Compressed upload from {} to {} bytes (q{})",
            original_size,
            compressed.bytes.len(),
            compressed.quality
        );
        (compressed.bytes, "jpg", Some(compressed.quality))
    };

    tokio::fs::create_dir_all(dir).await?;

    let file_name = unique_file_name(ext);
    let final_path = dir.join(&file_name);
    let temp_path = dir.join(format!(".{}.part", file_name));

    let written = async {
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, &final_path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(StoredImage {
        url: format!("/uploads/{}", file_name),
        file_name,
        size: bytes.len(),
        quality,
    })
}
