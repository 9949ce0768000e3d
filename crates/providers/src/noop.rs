use crate::{EmbedResponse, EmbeddingProvider, ProviderError};

/// Returns empty vectors; stands in when no backend is wired and in tests.
#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for NoopProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: vec![vec![]; texts.len()],
        })
    }

    fn model(&self) -> &str {
        "noop"
    }
}
