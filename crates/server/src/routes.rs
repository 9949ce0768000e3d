//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::path::PathBuf;
use suggest_core::models::{CollectionSummary, ModelComparison, SearchHit};
use suggest_core::populate::{populate_taxonomy, PopulateOptions};
use suggest_core::{catalog, compare, search};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::jobs::JobState;
use crate::AppState;

pub async fn index(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "search-suggest",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started.elapsed().as_secs(),
        "default_model": state.registry.default_model(),
        "default_collection": state.config.vectors.collection,
    }))
}

pub async fn list_models() -> Json<&'static [catalog::ModelInfo]> {
    Json(catalog::recommended_models())
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub collection: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: u64,
    pub model: Option<String>,
}

fn default_search_limit() -> u64 {
    10
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    let collection = resolve_collection(&state, params.collection, params.model.as_deref());
    let hits = search::search_categories(
        &state.registry,
        &state.store,
        &params.query,
        &collection,
        params.limit,
        params.model.as_deref(),
    )
    .await?;
    Ok(Json(hits))
}

/// The collection to search: explicit wins, then the model's derived
/// collection, then the configured default.
fn resolve_collection(
    state: &AppState,
    collection: Option<String>,
    model: Option<&str>,
) -> String {
    collection
        .or_else(|| model.map(catalog::collection_for_model))
        .unwrap_or_else(|| state.config.vectors.collection.clone())
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub query: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "default_compare_limit")]
    pub limit: u64,
}

fn default_compare_limit() -> u64 {
    5
}

pub async fn compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<Json<Vec<ModelComparison>>> {
    let models = if req.models.is_empty() {
        catalog::recommended_models()
            .iter()
            .map(|m| m.name.to_string())
            .collect()
    } else {
        req.models
    };
    let comparisons = compare::compare_models(
        &state.registry,
        &state.store,
        &req.query,
        &models,
        req.limit,
    )
    .await?;
    Ok(Json(comparisons))
}

pub async fn list_collections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CollectionSummary>>> {
    let names = state.store.list_collections().await?;
    let mut summaries = Vec::with_capacity(names.len());
    for name in names {
        // A collection we cannot describe still shows up, with the error inline.
        match state.store.collection_info(&name).await {
            Ok(info) => summaries.push(CollectionSummary {
                vector_size: info.vector_size(),
                points: info.points_count,
                name,
                error: None,
            }),
            Err(e) => summaries.push(CollectionSummary {
                name,
                points: None,
                vector_size: None,
                error: Some(e.to_string()),
            }),
        }
    }
    Ok(Json(summaries))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.delete_collection(&name).await? {
        Ok(Json(serde_json::json!({ "deleted": name })))
    } else {
        Err(ApiError::not_found(format!("no such collection: {name}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct PopulateRequest {
    pub taxonomy_file: Option<String>,
    pub collection: Option<String>,
    pub max_level: Option<usize>,
    pub model: Option<String>,
    pub batch_size: Option<usize>,
}

/// Kicks off the bulk load in the background and returns a job id straight
/// away; progress is polled via `/jobs/{id}`.
pub async fn populate(
    State(state): State<AppState>,
    Json(req): Json<PopulateRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let opts = PopulateOptions {
        taxonomy_file: PathBuf::from(
            req.taxonomy_file
                .unwrap_or_else(|| state.config.taxonomy.file.clone()),
        ),
        max_level: req.max_level.unwrap_or(state.config.taxonomy.max_level),
        collection: req.collection,
        model: req
            .model
            .unwrap_or_else(|| state.config.embeddings.model.clone()),
        batch_size: req.batch_size.unwrap_or(state.config.embeddings.batch_size),
    };

    let job_id = state.jobs.start();
    let jobs = state.jobs.clone();
    let registry = state.registry.clone();
    let store = state.store.clone();
    let id_for_task = job_id.clone();
    tokio::spawn(async move {
        match populate_taxonomy(opts, &registry, &store).await {
            Ok(summary) => jobs.finish(
                &id_for_task,
                JobState::Completed {
                    collection: summary.collection,
                    categories: summary.categories,
                },
            ),
            Err(e) => {
                error!(error = %e, "populate job failed");
                jobs.finish(
                    &id_for_task,
                    JobState::Failed {
                        error: e.to_string(),
                    },
                );
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "job_id": job_id, "state": "running" })),
    )
}

pub async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobState>> {
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no such job: {id}")))
}
