use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::upload::{UploadedImage, UploadedImages},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MAX_FILES: usize = 5;

pub async fn save_single(
    state: &AppState,
    user: &AuthUser,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadedImage>> {
    ensure_admin(user)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart body".into()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let saved = save_field(state, field).await?;

        if let Err(err) = log_audit(
            &state.pool,
            Some(user.user_id),
            "image_upload",
            Some("uploads"),
            Some(serde_json::json!({ "filename": saved.filename })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }

        return Ok(ApiResponse::success(
            "Image uploaded",
            saved,
            Some(Meta::empty()),
        ));
    }

    Err(AppError::BadRequest("No image file provided".into()))
}

pub async fn save_multiple(
    state: &AppState,
    user: &AuthUser,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadedImages>> {
    ensure_admin(user)?;

    let mut saved: Vec<UploadedImage> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart body".into()))?
    {
        if field.name() != Some("images") {
            continue;
        }
        if saved.len() == MAX_FILES {
            return Err(AppError::BadRequest("Too many files (max 5)".into()));
        }
        saved.push(save_field(state, field).await?);
    }

    if saved.is_empty() {
        return Err(AppError::BadRequest("No image files provided".into()));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "image_upload",
        Some("uploads"),
        Some(serde_json::json!({ "count": saved.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = UploadedImages {
        image_urls: saved.iter().map(|img| img.image_url.clone()).collect(),
        filenames: saved.into_iter().map(|img| img.filename).collect(),
    };

    Ok(ApiResponse::success(
        "Images uploaded",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn delete_file(
    state: &AppState,
    user: &AuthUser,
    filename: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    // Only bare filenames are accepted; anything that could escape the
    // upload directory is rejected outright.
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(AppError::BadRequest("Invalid filename".into()));
    }

    let path = state.upload_dir.join("products").join(filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound);
        }
        Err(err) => return Err(AppError::Internal(err.into())),
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "image_delete",
        Some("uploads"),
        Some(serde_json::json!({ "filename": filename })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn save_field(state: &AppState, field: Field<'_>) -> AppResult<UploadedImage> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest("Only image uploads are allowed".into()));
    }

    let original = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|_| AppError::BadRequest("Failed to read uploaded file".into()))?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest("File too large (max 5MB)".into()));
    }

    let dir = state.upload_dir.join("products");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    let filename = build_image_name(&original);
    tokio::fs::write(dir.join(&filename), &bytes)
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok(UploadedImage {
        image_url: format!("/uploads/products/{}", filename),
        filename,
    })
}

pub fn build_image_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");
    let suffix = Uuid::new_v4().to_string();
    let short = &suffix[..8];
    format!("product-{}-{}.{}", Utc::now().timestamp_millis(), short, ext)
}
