//! Generated image persisted in the `generated_images` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, spec::BinarySubtype, Binary};
use serde::{Deserialize, Serialize};

/// A stored image. Written once at insert time and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Prompt the image was generated from.
    pub prompt: String,

    /// Provider model variant.
    pub model: String,

    /// Normalized image bytes.
    pub image_data: Binary,

    pub content_type: String,

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Build a record for `image` with a fresh id and the current time.
    pub fn new(image: NewImage) -> Self {
        Self {
            id: ObjectId::new(),
            prompt: image.prompt,
            model: image.model,
            image_data: Binary {
                subtype: BinarySubtype::Generic,
                bytes: image.bytes,
            },
            content_type: image.content_type,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            id: self.id,
            prompt: self.prompt.clone(),
            model: self.model.clone(),
            created_at: self.created_at,
        }
    }
}

impl From<ImageRecord> for StoredImage {
    fn from(record: ImageRecord) -> Self {
        Self {
            bytes: record.image_data.bytes,
            content_type: record.content_type,
        }
    }
}

/// Listing projection of [`ImageRecord`] without the binary payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub prompt: String,
    pub model: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Input to [`crate::services::store::ImageStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub prompt: String,
    pub model: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// What a read hands back: the bytes exactly as inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
