use super::{ImageStore, StoreError};
use crate::models::{ImageRecord, ImageSummary, NewImage, StoredImage};
use crate::services::metrics::record_db_operation;
use crate::services::MongoDb;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use std::time::Instant;

#[derive(Clone)]
pub struct MongoImageStore {
    db: MongoDb,
}

impl MongoImageStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImageStore for MongoImageStore {
    async fn insert(&self, image: NewImage) -> Result<String, StoreError> {
        let record = ImageRecord::new(image);
        let start = Instant::now();

        self.db
            .images()
            .insert_one(&record, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert image record: {}", e);
                e
            })?;

        record_db_operation("insert", start.elapsed().as_secs_f64());
        tracing::info!(
            image_id = %record.id,
            size = record.image_data.bytes.len(),
            "Stored generated image"
        );

        Ok(record.id.to_hex())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredImage>, StoreError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            tracing::debug!(image_id = %id, "Rejecting malformed image id");
            return Ok(None);
        };

        let start = Instant::now();
        let record = self
            .db
            .images()
            .find_one(doc! { "_id": object_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find image record: {}", e);
                e
            })?;
        record_db_operation("find_one", start.elapsed().as_secs_f64());

        Ok(record.map(StoredImage::from))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ImageSummary>, StoreError> {
        let options = FindOptions::builder()
            .projection(doc! { "image_data": 0, "content_type": 0 })
            .sort(doc! { "created_at": -1 })
            .limit(i64::from(limit))
            .build();

        let start = Instant::now();
        let cursor = self
            .db
            .images()
            .clone_with_type::<ImageSummary>()
            .find(doc! {}, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query image records: {}", e);
                e
            })?;

        let summaries: Vec<ImageSummary> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect image records: {}", e);
            e
        })?;
        record_db_operation("find", start.elapsed().as_secs_f64());

        Ok(summaries)
    }
}
