//! Image persistence.
//!
//! Records are immutable and addressed only by the id assigned at insert
//! time. A malformed id is reported exactly like a missing one.

pub mod memory;
pub mod mongo;

use crate::models::{ImageSummary, NewImage, StoredImage};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryImageStore;
pub use mongo::MongoImageStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist one record and return its id. Identical inputs create distinct records.
    async fn insert(&self, image: NewImage) -> Result<String, StoreError>;

    /// Look up by id. `Ok(None)` for unknown and for unparseable ids alike.
    async fn get(&self, id: &str) -> Result<Option<StoredImage>, StoreError>;

    /// Newest first, without image bytes.
    async fn list_recent(&self, limit: u32) -> Result<Vec<ImageSummary>, StoreError>;
}
