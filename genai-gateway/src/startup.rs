//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::handlers;
use crate::middleware::metrics_middleware;
use crate::services::providers::apiyi::ApiyiImageConfig;
use crate::services::{
    ApiyiImageProvider, ImageGenerationService, ImageNormalizer, ImageProvider, ImageStore,
    MongoDb, MongoImageStore, Quality, VeoSubmitter,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{cors_layer, request_id_middleware, request_span};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    /// `None` when running on the in-memory store.
    pub db: Option<MongoDb>,
    pub generation: ImageGenerationService,
    pub video: VeoSubmitter,
}

impl AppState {
    /// State wired to an arbitrary provider and store.
    pub fn new(
        config: GatewayConfig,
        db: Option<MongoDb>,
        provider: Arc<dyn ImageProvider>,
        store: Arc<dyn ImageStore>,
    ) -> Result<Self, AppError> {
        let video = VeoSubmitter::new(&config.apiyi)?;
        let generation =
            ImageGenerationService::new(provider, ImageNormalizer::new(Quality::DEFAULT), store);

        Ok(Self {
            config: Arc::new(config),
            db,
            generation,
            video,
        })
    }
}

/// All routes with their middleware stack.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/generateImage", get(handlers::list_images))
        .route("/generateImage/generate", post(handlers::generate_image))
        .route("/generateImage/save", post(handlers::save_image))
        .route("/generateImage/view/:id", get(handlers::view_image))
        .route("/videos/easy-mode", post(handlers::submit_easy_mode));

    let cors = cors_layer(&state.config.allowed_origins());

    Router::new()
        .nest(crate::dtos::API_PREFIX, api)
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to MongoDB, build the providers and bind the listener.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let provider = ApiyiImageProvider::new(ApiyiImageConfig::from(&config.apiyi))
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
        tracing::info!(
            url = %config.apiyi.image_url(),
            timeout_secs = config.apiyi.image_timeout_secs,
            "Initialized APIYI image provider"
        );

        let store: Arc<dyn ImageStore> = Arc::new(MongoImageStore::new(db.clone()));
        let state = AppState::new(config.clone(), Some(db), Arc::new(provider), store)?;
        tracing::info!(url = %state.video.url(), "Initialized APIYI video submitter");

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("genai-gateway listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves, drain in-flight requests, then close
    /// the MongoDB client.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let db = self.state.db.clone();
        let router = build_router(self.state);

        let result = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }

        if let Some(db) = db {
            db.shutdown().await;
        }

        result
    }
}
