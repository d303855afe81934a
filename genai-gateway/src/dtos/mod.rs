//! Request and response bodies of the HTTP API.

pub mod images;
pub mod videos;

pub use images::{
    GenerateImageResponse, GenerationRequest, ImageListItem, ImageListResponse, ListImagesQuery,
    SaveImageRequest, SaveImageResponse,
};
pub use videos::{VideoSubmitRequest, VideoSubmitResponse};

/// Path prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Relative path of the view endpoint for image `id`.
pub fn view_path(id: &str) -> String {
    format!("{}/generateImage/view/{}", API_PREFIX, id)
}

/// Absolute view URL when a public base URL is configured, otherwise the relative path.
pub fn view_url(public_base_url: Option<&str>, id: &str) -> String {
    match public_base_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), view_path(id)),
        None => view_path(id),
    }
}
