use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::auth::AdminUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::image_service::{
    self, CompressionPolicy, MAX_UPLOAD_BYTES, StoredImage, image_extension,
};
use crate::services::vision_service::BookSuggestion;

struct UploadedFile {
    data: Vec<u8>,
    content_type: Option<String>,
}

/// First multipart field named `image` (or `file`).
async fn read_image_field(mut multipart: Multipart) -> Result<UploadedFile, DomainError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::Validation(format!("Invalid upload: {}", e)))?
    {
        if !matches!(field.name(), Some("image") | Some("file")) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| DomainError::Validation(format!("Invalid upload: {}", e)))?;

        return Ok(UploadedFile {
            data: data.to_vec(),
            content_type,
        });
    }

    Err(DomainError::Validation("No image provided".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/upload-image",
    responses(
        (status = 200, description = "Image stored, body carries its URL"),
        (status = 400, description = "Missing, oversized or unsupported image")
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<Json<StoredImage>, DomainError> {
    let upload = read_image_field(multipart).await?;
    let stored = image_service::store_image(
        &state.config.upload_dir,
        upload.data,
        upload.content_type.as_deref(),
        &CompressionPolicy::default(),
    )
    .await?;

    tracing::info!("Stored upload {} ({} bytes)", stored.file_name, stored.size);
    Ok(Json(stored))
}

/// Suggests book fields from a cover photo.
pub async fn analyze_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<Json<BookSuggestion>, DomainError> {
    let vision = state
        .vision
        .clone()
        .ok_or_else(|| DomainError::Unavailable("Image analysis is not configured".to_string()))?;

    let upload = read_image_field(multipart).await?;
    if upload.data.is_empty() {
        return Err(DomainError::Validation("No image provided".to_string()));
    }
    if upload.data.len() > MAX_UPLOAD_BYTES {
        return Err(DomainError::Validation("Image is too large".to_string()));
    }

    let mime = match image_extension(upload.content_type.as_deref(), &upload.data)? {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/jpeg",
    };

    Ok(Json(vision.suggest_book_fields(&upload.data, mime).await?))
}
