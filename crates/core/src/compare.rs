//! Runs one query against several models' collections and times each.

use crate::catalog;
use crate::models::ModelComparison;
use crate::search;
use providers::qdrant::QdrantClient;
use providers::ModelRegistry;
use std::time::Instant;
use tracing::debug;

pub async fn compare_models(
    registry: &ModelRegistry,
    store: &QdrantClient,
    query: &str,
    models: &[String],
    limit: u64,
) -> anyhow::Result<Vec<ModelComparison>> {
    let mut comparisons = Vec::with_capacity(models.len());
    for model in models {
        let collection = catalog::collection_for_model(model);
        let started = Instant::now();
        let results =
            search::search_categories(registry, store, query, &collection, limit, Some(model))
                .await?;
        let query_time_ms = started.elapsed().as_millis();
        debug!(model = %model, query_time_ms, hits = results.len(), "compared model");
        comparisons.push(ModelComparison {
            model: model.clone(),
            collection,
            query_time_ms,
            results,
        });
    }
    Ok(comparisons)
}
