use crate::models::ImageSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_IMAGE_MODEL: &str = "nano-banana-pro";
pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const MAX_LIST_LIMIT: u32 = 200;

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,

    #[serde(default = "default_image_model")]
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub success: bool,
    pub image_id: String,
    pub message: String,
}

/// Store an image the caller already has, as a data URI or bare base64.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveImageRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,

    #[serde(default = "default_image_model")]
    pub model: String,

    #[validate(length(min = 1, message = "Image data is required"))]
    pub image_data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveImageResponse {
    pub success: bool,
    pub image_id: String,
    pub view_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListImagesQuery {
    pub limit: Option<u32>,
}

impl ListImagesQuery {
    /// Requested limit clamped to `1..=200`, 50 when absent.
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageListItem {
    pub id: String,
    pub prompt: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub view_url: String,
}

impl ImageListItem {
    pub fn from_summary(summary: ImageSummary, public_base_url: Option<&str>) -> Self {
        let id = summary.id.to_hex();
        Self {
            view_url: super::view_url(public_base_url, &id),
            id,
            prompt: summary.prompt,
            model: summary.model,
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageListResponse {
    pub success: bool,
    pub count: usize,
    pub images: Vec<ImageListItem>,
}
