//! HTTP handlers for the gateway.

pub mod health;
pub mod images;
pub mod videos;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use images::{generate_image, list_images, save_image, view_image};
pub use videos::submit_easy_mode;
