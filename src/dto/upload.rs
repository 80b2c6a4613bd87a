use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImage {
    pub image_url: String,
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImages {
    pub image_urls: Vec<String>,
    pub filenames: Vec<String>,
}
