//! Veo video submission through APIYI.
//!
//! Video jobs are not stored by this service; the request body is forwarded
//! and the provider's JSON answer is handed back to the caller.

use crate::config::ApiyiConfig;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use service_core::error::AppError;
use thiserror::Error;

const PROVIDER_NAME: &str = "apiyi";

/// How much of a non-JSON body to echo back for diagnostics.
const BODY_PREFIX_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum VideoSubmitError {
    #[error("APIYI request timed out: {0}")]
    Timeout(String),

    #[error("APIYI request failed: {0}")]
    Request(String),

    #[error("APIYI returned a non-JSON response (status {status})")]
    NonJson {
        status: u16,
        url: String,
        content_type: String,
        body_prefix: String,
    },

    #[error("APIYI returned an error (status {status})")]
    Upstream { status: u16, body: Value },
}

impl From<VideoSubmitError> for AppError {
    fn from(err: VideoSubmitError) -> Self {
        match err {
            VideoSubmitError::Timeout(_) => AppError::GatewayTimeout(err.to_string()),
            VideoSubmitError::Request(_) => AppError::BadGateway(err.to_string()),
            VideoSubmitError::NonJson {
                status,
                url,
                content_type,
                body_prefix,
            } => AppError::UpstreamError(json!({
                "message": "APIYI returned a non-JSON response (likely wrong endpoint or auth issue)",
                "provider_status": status,
                "provider_url": url,
                "provider_content_type": content_type,
                "provider_body_prefix": body_prefix,
            })),
            VideoSubmitError::Upstream { status, body } => AppError::UpstreamError(json!({
                "message": "APIYI returned an error",
                "provider_status": status,
                "provider_response": body,
            })),
        }
    }
}

/// Successful provider answer.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSubmission {
    pub provider: &'static str,
    pub status: StatusCode,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct VeoSubmitter {
    api_key: String,
    url: String,
    client: Client,
}

impl VeoSubmitter {
    pub fn new(config: &ApiyiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.video_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            url: config.video_submit_url(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward `payload` verbatim.
    pub async fn submit(&self, payload: &Value) -> Result<VideoSubmission, VideoSubmitError> {
        tracing::info!(url = %self.url, "Submitting video generation to APIYI");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VideoSubmitError::Timeout(e.to_string())
                } else {
                    VideoSubmitError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                VideoSubmitError::Timeout(e.to_string())
            } else {
                VideoSubmitError::Request(e.to_string())
            }
        })?;

        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) => {
                tracing::warn!(
                    status = %status,
                    content_type = %content_type,
                    "APIYI returned a non-JSON video response"
                );
                return Err(VideoSubmitError::NonJson {
                    status: status.as_u16(),
                    url: self.url.clone(),
                    content_type,
                    body_prefix: text.chars().take(BODY_PREFIX_CHARS).collect(),
                });
            }
        };

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(status = %status, "APIYI rejected video submission");
            return Err(VideoSubmitError::Upstream {
                status: status.as_u16(),
                body: data,
            });
        }

        Ok(VideoSubmission {
            provider: PROVIDER_NAME,
            status,
            data,
        })
    }
}
