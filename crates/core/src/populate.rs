//! Bulk-loads taxonomy embeddings into the vector store.

use crate::catalog;
use crate::config::AppConfig;
use crate::taxonomy::Taxonomy;
use anyhow::Context;
use providers::qdrant::{self, Distance, QdrantClient, QdrantConfig, QdrantPoint};
use providers::{EmbeddingBackend, ModelRegistry};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PopulateOptions {
    pub taxonomy_file: PathBuf,
    pub max_level: usize,
    /// Defaults to the model-derived collection name when absent.
    pub collection: Option<String>,
    pub model: String,
    pub batch_size: usize,
}

#[derive(Debug, Default, serde::Serialize)]
pub struct PopulateSummary {
    pub collection: String,
    pub model: String,
    pub dimension: usize,
    pub categories: usize,
    pub batches: usize,
}

/// Parse the taxonomy, embed every category up to the configured level, and
/// upsert the vectors with their category payloads.
pub async fn populate_taxonomy(
    opts: PopulateOptions,
    registry: &ModelRegistry,
    store: &QdrantClient,
) -> anyhow::Result<PopulateSummary> {
    let taxonomy = Taxonomy::from_file(&opts.taxonomy_file).context("read taxonomy")?;
    let rich = taxonomy.rich_categories_for_embedding(opts.max_level);
    let collection = opts
        .collection
        .clone()
        .unwrap_or_else(|| catalog::collection_for_model(&opts.model));

    let provider = registry.for_model(Some(&opts.model))?;
    let dimension = match catalog::model_info(&opts.model) {
        Some(info) => info.dimension,
        None => probe_dimension(provider.as_ref()).await?,
    };

    store
        .ensure_collection(&collection, dimension as u64, Distance::Cosine)
        .await?;

    let batch_size = opts.batch_size.max(1);
    let total_batches = rich.len().div_ceil(batch_size);
    info!(
        categories = rich.len(),
        batches = total_batches,
        model = %opts.model,
        dimension,
        collection = %collection,
        "populating taxonomy embeddings"
    );

    for (index, batch) in rich.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
        let embedded = provider.embed(&texts).await?;
        anyhow::ensure!(
            embedded.vectors.len() == batch.len(),
            "embedding backend returned {} vectors for {} inputs",
            embedded.vectors.len(),
            batch.len()
        );

        let points = batch
            .iter()
            .zip(embedded.vectors.into_iter())
            .map(|((id, _), vector)| QdrantPoint {
                id: qdrant::point_id(id),
                vector,
                payload: category_payload(&taxonomy, id),
            })
            .collect();
        store.upsert(&collection, points).await?;
        info!(batch = index + 1, total = total_batches, "embedded batch");
    }

    Ok(PopulateSummary {
        collection,
        model: opts.model,
        dimension,
        categories: rich.len(),
        batches: total_batches,
    })
}

async fn probe_dimension(provider: &dyn providers::EmbeddingProvider) -> anyhow::Result<usize> {
    let resp = provider.embed(&["dimension probe".to_string()]).await?;
    let vector = resp
        .vectors
        .into_iter()
        .next()
        .context("embedding backend returned no vector for the dimension probe")?;
    Ok(vector.len())
}

fn category_payload(taxonomy: &Taxonomy, id: &str) -> HashMap<String, serde_json::Value> {
    let mut payload = HashMap::new();
    payload.insert("original_id".to_string(), serde_json::json!(id));
    if let Some(category) = taxonomy.get(id) {
        payload.insert("id".to_string(), serde_json::json!(category.id));
        payload.insert("name".to_string(), serde_json::json!(category.name));
        payload.insert(
            "full_path".to_string(),
            serde_json::json!(category.full_path),
        );
        payload.insert("level".to_string(), serde_json::json!(category.level));
        payload.insert(
            "path_parts".to_string(),
            serde_json::json!(category.path_parts),
        );
    }
    payload
}

pub fn build_registry(config: &AppConfig) -> ModelRegistry {
    let api_key = config
        .embeddings
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());
    let backend = EmbeddingBackend {
        base_url: config.embeddings.base_url.clone(),
        api_key,
    };
    ModelRegistry::new(backend, config.embeddings.model.clone())
}

pub fn build_store(config: &AppConfig) -> QdrantClient {
    let api_key = config
        .vectors
        .api_key
        .clone()
        .or_else(|| std::env::var("QDRANT_API_KEY").ok());
    QdrantClient::new(QdrantConfig {
        url: config.vectors.url.clone(),
        api_key,
    })
}
