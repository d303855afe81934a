use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use validator::Validate;

use crate::dtos::{VideoSubmitRequest, VideoSubmitResponse};
use crate::services::metrics::record_video_submission;
use crate::AppState;
use service_core::error::AppError;

/// Forward a video generation job to the provider.
///
/// POST /api/v1/videos/easy-mode
///
/// The provider's status code is passed through on success.
pub async fn submit_easy_mode(
    State(state): State<AppState>,
    Json(req): Json<VideoSubmitRequest>,
) -> Result<(StatusCode, Json<VideoSubmitResponse>), AppError> {
    req.validate()?;

    let payload = req
        .to_forward_payload()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid video request: {}", e)))?;

    tracing::info!(model = %req.model, "Submitting video generation");

    let submission = state.video.submit(&payload).await.map_err(|e| {
        tracing::warn!(error = %e, "Video submission failed");
        record_video_submission("error");
        AppError::from(e)
    })?;
    record_video_submission("success");

    Ok((
        submission.status,
        Json(VideoSubmitResponse {
            provider: submission.provider.to_string(),
            status_code: submission.status.as_u16(),
            data: submission.data,
        }),
    ))
}
