use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, post},
};

use crate::{
    dto::upload::{UploadedImage, UploadedImages},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::upload_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/single", post(upload_single))
        .route("/multiple", post(upload_multiple))
        .route("/{filename}", delete(delete_upload))
}

#[utoipa::path(
    post,
    path = "/api/upload/single",
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<UploadedImage>),
        (status = 400, description = "Missing, oversized or non-image file"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn upload_single(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadedImage>>)> {
    let resp = upload_service::save_single(&state, &user, multipart).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/upload/multiple",
    responses(
        (status = 201, description = "Images stored", body = ApiResponse<UploadedImages>),
        (status = 400, description = "Missing, oversized or non-image files"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn upload_multiple(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadedImages>>)> {
    let resp = upload_service::save_multiple(&state, &user, multipart).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/upload/{filename}",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Image removed", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid filename"),
        (status = 404, description = "File not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn delete_upload(
    State(state): State<AppState>,
    user: AuthUser,
    Path(filename): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = upload_service::delete_file(&state, &user, &filename).await?;
    Ok(Json(resp))
}
