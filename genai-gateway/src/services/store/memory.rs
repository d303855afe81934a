use super::{ImageStore, StoreError};
use crate::models::{ImageRecord, ImageSummary, NewImage, StoredImage};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store with the same id scheme as MongoDB. Used by tests
/// and for running the gateway without a database.
#[derive(Default)]
pub struct InMemoryImageStore {
    records: RwLock<HashMap<ObjectId, ImageRecord>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn insert(&self, image: NewImage) -> Result<String, StoreError> {
        let record = ImageRecord::new(image);
        let id = record.id;
        self.records.write().await.insert(id, record);
        Ok(id.to_hex())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredImage>, StoreError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        Ok(self
            .records
            .read()
            .await
            .get(&object_id)
            .cloned()
            .map(StoredImage::from))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ImageSummary>, StoreError> {
        let records = self.records.read().await;
        let mut summaries: Vec<ImageSummary> = records.values().map(ImageRecord::summary).collect();
        // ObjectIds embed a timestamp and counter; use them to break ties.
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        summaries.truncate(limit as usize);
        Ok(summaries)
    }
}
