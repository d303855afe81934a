pub mod codec;
pub mod database;
pub mod generation;
pub mod metrics;
pub mod providers;
pub mod store;

pub use codec::{ImageNormalizer, Quality};
pub use database::MongoDb;
pub use generation::{GenerationError, ImageGenerationService};
pub use providers::{ApiyiImageProvider, ImageProvider, VeoSubmitter};
pub use store::{ImageStore, InMemoryImageStore, MongoImageStore};
