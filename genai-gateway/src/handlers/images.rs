//! Image generation, storage and retrieval handlers.

use axum::{
    extract::{Json, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::dtos::{
    view_path, view_url, GenerateImageResponse, GenerationRequest, ImageListItem,
    ImageListResponse, ListImagesQuery, SaveImageRequest, SaveImageResponse,
};
use crate::AppState;
use service_core::error::AppError;

/// Stored images never change, so clients and proxies may cache them forever.
const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Generate an image from a prompt and store it.
///
/// POST /api/v1/generateImage/generate
pub async fn generate_image(
    State(state): State<AppState>,
    Json(req): Json<GenerationRequest>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    req.validate()?;

    tracing::info!(
        model = %req.model,
        prompt_len = req.prompt.len(),
        "Generating image"
    );

    let image_id = state.generation.generate(&req.prompt, &req.model).await?;

    tracing::info!(image_id = %image_id, model = %req.model, "Image generated");

    Ok(Json(GenerateImageResponse {
        success: true,
        message: format!("Image saved. View at: {}", view_path(&image_id)),
        image_id,
    }))
}

/// Raw bytes of a stored image.
///
/// GET /api/v1/generateImage/view/{id}
pub async fn view_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, AppError> {
    let image = state.generation.fetch(&image_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CONTENT_LENGTH, image.bytes.len().to_string()),
            (header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL.to_string()),
        ],
        image.bytes,
    )
        .into_response())
}

/// Most recent images, newest first, without their bytes.
///
/// GET /api/v1/generateImage?limit=
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ListImagesQuery>,
) -> Result<Json<ImageListResponse>, AppError> {
    let summaries = state.generation.list(query.limit()).await?;
    let public_base_url = state.config.http.public_base_url.as_deref();

    let images: Vec<ImageListItem> = summaries
        .into_iter()
        .map(|summary| ImageListItem::from_summary(summary, public_base_url))
        .collect();

    Ok(Json(ImageListResponse {
        success: true,
        count: images.len(),
        images,
    }))
}

/// Normalize and store an image supplied by the caller.
///
/// POST /api/v1/generateImage/save
pub async fn save_image(
    State(state): State<AppState>,
    Json(req): Json<SaveImageRequest>,
) -> Result<Json<SaveImageResponse>, AppError> {
    req.validate()?;

    let image_id = state
        .generation
        .save(&req.prompt, &req.model, &req.image_data)
        .await?;

    tracing::info!(image_id = %image_id, model = %req.model, "Caller image saved");

    Ok(Json(SaveImageResponse {
        success: true,
        view_url: view_url(state.config.http.public_base_url.as_deref(), &image_id),
        image_id,
    }))
}
