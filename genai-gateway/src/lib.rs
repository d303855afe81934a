//! genai-gateway: HTTP gateway for AI image and video generation.
//!
//! Images come from an OpenAI-compatible chat provider, are re-encoded as
//! JPEG and kept in MongoDB; video jobs are proxied to the provider as-is.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
