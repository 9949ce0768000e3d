//! HTTP API for search suggestions, built on axum.

use axum::routing::{delete, get, post};
use axum::Router;
use providers::qdrant::QdrantClient;
use providers::ModelRegistry;
use std::sync::Arc;
use suggest_core::config::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod jobs;
pub mod routes;

/// Everything handlers need, passed explicitly through axum state. The
/// registry and store are owned here for the process lifetime; no globals.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<ModelRegistry>,
    pub store: QdrantClient,
    pub jobs: jobs::JobTracker,
    pub started: std::time::Instant,
}

impl AppState {
    pub fn new(config: AppConfig, registry: Arc<ModelRegistry>, store: QdrantClient) -> Self {
        Self {
            config,
            registry,
            store,
            jobs: jobs::JobTracker::default(),
            started: std::time::Instant::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/models", get(routes::list_models))
        .route("/search", get(routes::search))
        .route("/compare", post(routes::compare))
        .route("/collections", get(routes::list_collections))
        .route("/collections/{name}", delete(routes::delete_collection))
        .route("/populate", post(routes::populate))
        .route("/jobs/{id}", get(routes::job_status))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
