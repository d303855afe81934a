//! Mock provider implementation for testing.

use super::{ImageProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns a fixed outcome for every call and counts invocations.
pub struct MockImageProvider {
    outcome: Result<Vec<u8>, ProviderError>,
    calls: AtomicUsize,
}

impl MockImageProvider {
    /// Always succeed with `bytes`.
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self {
            outcome: Ok(bytes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_image_bytes(
        &self,
        _prompt: &str,
        _model: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
