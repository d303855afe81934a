//! APIYI image provider.
//!
//! APIYI exposes image models through an OpenAI-compatible chat completions
//! endpoint. The generated image comes back inline, as a data URI inside the
//! assistant message text.

use super::{find_data_uri_image, ImageProvider, ProviderError};
use crate::config::ApiyiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// APIYI image provider configuration.
#[derive(Debug, Clone)]
pub struct ApiyiImageConfig {
    pub api_key: String,
    /// Full chat completions URL.
    pub url: String,
    pub timeout: Duration,
}

impl From<&ApiyiConfig> for ApiyiImageConfig {
    fn from(config: &ApiyiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            url: config.image_url(),
            timeout: config.image_timeout(),
        }
    }
}

pub struct ApiyiImageProvider {
    config: ApiyiImageConfig,
    client: Client,
}

impl ApiyiImageProvider {
    pub fn new(config: ApiyiImageConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "APIYI API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ImageProvider for ApiyiImageProvider {
    fn name(&self) -> &'static str {
        "apiyi"
    }

    async fn generate_image_bytes(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        let request = ChatCompletionRequest {
            model,
            stream: false,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(
            model = %model,
            prompt_len = prompt.len(),
            url = %self.config.url,
            "Sending image request to APIYI"
        );

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Only a plain 200 carries a chat completion.
        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = %status, "APIYI returned an error status");
            return Err(ProviderError::Api(body));
        }

        let content = extract_message_content(&body)?;

        let image = find_data_uri_image(&content).ok_or_else(|| {
            tracing::warn!(
                model = %model,
                content_len = content.len(),
                "APIYI response contained no inline image"
            );
            ProviderError::NoImageFound
        })?;

        let bytes = image
            .decode()
            .map_err(|e| ProviderError::InvalidImagePayload(e.to_string()))?;

        tracing::debug!(
            mime_type = %image.mime_type(),
            size = bytes.len(),
            "Extracted image from APIYI response"
        );

        Ok(bytes)
    }
}

/// Pull `choices[0].message.content` out of a chat completions body.
fn extract_message_content(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|_| ProviderError::InvalidResponseFormat)?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(ProviderError::InvalidResponseFormat)
}

// ============================================================================
// APIYI Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}
