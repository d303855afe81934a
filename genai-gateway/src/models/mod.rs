//! Domain models for the gateway.

pub mod image;

pub use image::{ImageRecord, ImageSummary, NewImage, StoredImage};
