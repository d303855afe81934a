//! Image generation pipeline: provider -> normalizer -> store.
//!
//! Each request runs the stages once, in order. A failing stage ends the
//! request and nothing is persisted.

use crate::models::{ImageSummary, NewImage, StoredImage};
use crate::services::codec::{CodecError, ImageNormalizer, NormalizedImage};
use crate::services::metrics;
use crate::services::providers::data_uri::decode_image_data;
use crate::services::providers::{ImageProvider, ProviderError};
use crate::services::store::{ImageStore, StoreError};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Failure of the pipeline, tagged with the stage that produced it.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Image not found")]
    NotFound,

    #[error("{0}")]
    InvalidInput(String),
}

impl GenerationError {
    fn outcome(&self) -> &'static str {
        match self {
            GenerationError::Provider(_) => "provider_error",
            GenerationError::Codec(_) => "codec_error",
            GenerationError::Store(_) => "store_error",
            GenerationError::NotFound => "not_found",
            GenerationError::InvalidInput(_) => "invalid_input",
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            // Every provider failure, timeouts included, is an upstream failure.
            GenerationError::Provider(e) => AppError::BadGateway(e.to_string()),
            GenerationError::Codec(e) => {
                AppError::InternalError(anyhow::anyhow!("Image processing failed: {}", e))
            }
            GenerationError::Store(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            GenerationError::NotFound => AppError::NotFound(anyhow::anyhow!("Image not found")),
            GenerationError::InvalidInput(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
        }
    }
}

#[derive(Clone)]
pub struct ImageGenerationService {
    provider: Arc<dyn ImageProvider>,
    normalizer: ImageNormalizer,
    store: Arc<dyn ImageStore>,
}

impl ImageGenerationService {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        normalizer: ImageNormalizer,
        store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            provider,
            normalizer,
            store,
        }
    }

    /// Generate an image for `prompt`, normalize it and store it.
    ///
    /// Returns the new record's id.
    pub async fn generate(&self, prompt: &str, model: &str) -> Result<String, GenerationError> {
        let result = self.run_pipeline(prompt, model).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::record_image_generation(self.provider.name(), outcome);

        result
    }

    async fn run_pipeline(&self, prompt: &str, model: &str) -> Result<String, GenerationError> {
        let provider = self.provider.name();
        let start = Instant::now();

        let raw = self
            .provider
            .generate_image_bytes(prompt, model)
            .await
            .map_err(|e| {
                tracing::warn!(provider, model, error = %e, "Image provider call failed");
                metrics::record_provider_error(provider, e.kind());
                e
            })?;

        metrics::record_provider_latency(provider, start.elapsed().as_secs_f64());
        tracing::info!(
            provider,
            model,
            raw_size = raw.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Received image from provider"
        );

        self.normalize_and_store(prompt, model, raw).await
    }

    /// Store an image supplied by the caller as a data URI or bare base64.
    pub async fn save(
        &self,
        prompt: &str,
        model: &str,
        image_data: &str,
    ) -> Result<String, GenerationError> {
        let raw = decode_image_data(image_data).map_err(|e| {
            GenerationError::InvalidInput(format!("Invalid base64 image data: {}", e))
        })?;

        self.normalize_and_store(prompt, model, raw).await
    }

    /// Bytes and content type of a stored image, exactly as inserted.
    pub async fn fetch(&self, id: &str) -> Result<StoredImage, GenerationError> {
        self.store.get(id).await?.ok_or(GenerationError::NotFound)
    }

    pub async fn list(&self, limit: u32) -> Result<Vec<ImageSummary>, GenerationError> {
        Ok(self.store.list_recent(limit).await?)
    }

    async fn normalize_and_store(
        &self,
        prompt: &str,
        model: &str,
        raw: Vec<u8>,
    ) -> Result<String, GenerationError> {
        let normalized = self.normalize(raw).await?;

        let id = self
            .store
            .insert(NewImage {
                prompt: prompt.to_string(),
                model: model.to_string(),
                bytes: normalized.bytes,
                content_type: normalized.content_type.to_string(),
            })
            .await?;

        Ok(id)
    }

    /// Decoding and re-encoding is CPU-bound, so it runs on the blocking pool.
    async fn normalize(&self, raw: Vec<u8>) -> Result<NormalizedImage, GenerationError> {
        let normalizer = self.normalizer;
        let normalized = tokio::task::spawn_blocking(move || normalizer.normalize(&raw))
            .await
            .map_err(|e| CodecError::Encode(format!("Normalization task failed: {}", e)))?;

        normalized.map_err(|e| {
            tracing::warn!(error = %e, "Image normalization failed");
            GenerationError::Codec(e)
        })
    }
}
