//! AI provider abstractions and implementations.
//!
//! Image generation sits behind the [`ImageProvider`] trait so the pipeline
//! can run against APIYI in production and an in-process mock in tests.
//! Video submission is a plain pass-through proxy (see [`veo`]).

pub mod apiyi;
pub mod data_uri;
pub mod mock;
pub mod veo;

use async_trait::async_trait;
use thiserror::Error;

pub use apiyi::ApiyiImageProvider;
pub use data_uri::{find_data_uri_image, DataUriImage};
pub use mock::MockImageProvider;
pub use veo::VeoSubmitter;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Non-success HTTP status; carries the raw response body.
    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response format")]
    InvalidResponseFormat,

    #[error("No image found in response")]
    NoImageFound,

    #[error("Invalid image payload: {0}")]
    InvalidImagePayload(String),

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Api(_) => "api",
            ProviderError::InvalidResponseFormat => "invalid_response",
            ProviderError::NoImageFound => "no_image",
            ProviderError::InvalidImagePayload(_) => "invalid_payload",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Network(_) => "network",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Trait for text-to-image providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Generate one image and return its raw (still encoded) bytes.
    ///
    /// The bytes are not checked to be a valid image; that happens in the codec.
    async fn generate_image_bytes(&self, prompt: &str, model: &str)
        -> Result<Vec<u8>, ProviderError>;
}
