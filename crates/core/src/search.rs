use crate::models::SearchHit;
use anyhow::Context;
use providers::qdrant::QdrantClient;
use providers::ModelRegistry;

/// Embed `query` with the selected model and return the nearest categories
/// from `collection`.
pub async fn search_categories(
    registry: &ModelRegistry,
    store: &QdrantClient,
    query: &str,
    collection: &str,
    limit: u64,
    model: Option<&str>,
) -> anyhow::Result<Vec<SearchHit>> {
    let provider = registry.for_model(model)?;
    let embedded = provider.embed(&[query.to_string()]).await?;
    let vector = embedded
        .vectors
        .into_iter()
        .next()
        .context("embedding backend returned no vector for the query")?;
    let results = store.search(collection, vector, limit).await?;
    Ok(results.into_iter().map(SearchHit::from_point).collect())
}
