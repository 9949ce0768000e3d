//! Provider abstractions for embedding backends and the vector store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

pub mod noop;
pub mod openai;
pub mod qdrant;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("no embedding backend configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub vectors: Vec<Vec<f32>>,
}

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError>;
    fn model(&self) -> &str;
}

/// Connection details shared by all per-model providers.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingBackend {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Explicit registry of per-model embedding providers, owned by the process
/// and handed to handlers. One provider is built per model name and cached;
/// `for_model(None)` resolves the default model.
pub struct ModelRegistry {
    backend: EmbeddingBackend,
    default_model: String,
    providers: RwLock<HashMap<String, Arc<dyn EmbeddingProvider>>>,
}

impl ModelRegistry {
    pub fn new(backend: EmbeddingBackend, default_model: impl Into<String>) -> Self {
        Self {
            backend,
            default_model: default_model.into(),
            providers: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Pre-register a provider under a model name. Used to wire test doubles
    /// and non-HTTP backends.
    pub fn with_provider(self, model: &str, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.providers
            .write()
            .expect("registry lock poisoned")
            .insert(model.to_string(), provider);
        self
    }

    pub fn for_model(&self, model: Option<&str>) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
        let name = model.unwrap_or(&self.default_model);
        if let Some(provider) = self
            .providers
            .read()
            .expect("registry lock poisoned")
            .get(name)
        {
            return Ok(provider.clone());
        }
        if self.backend.base_url.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let provider: Arc<dyn EmbeddingProvider> =
            Arc::new(openai::OpenAiProvider::new(openai::OpenAiConfig {
                base_url: self.backend.base_url.clone(),
                api_key: self.backend.api_key.clone(),
                model: name.to_string(),
            }));
        self.providers
            .write()
            .expect("registry lock poisoned")
            .insert(name.to_string(), provider.clone());
        Ok(provider)
    }
}
