use crate::{EmbedResponse, EmbeddingProvider, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

/// Instruction prefix BGE models expect on retrieval inputs.
const BGE_RETRIEVAL_PREFIX: &str = "Represent this sentence for searching relevant passages: ";

#[derive(Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Embedding provider speaking the OpenAI `/v1/embeddings` wire format, as
/// served by OpenAI itself, LM Studio, and text-embeddings-inference.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiProvider {
    pub fn new(cfg: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    fn prepare_inputs(&self, texts: &[String]) -> Vec<String> {
        if self.cfg.model.to_lowercase().contains("bge") {
            texts
                .iter()
                .map(|t| format!("{}{}", BGE_RETRIEVAL_PREFIX, t))
                .collect()
        } else {
            texts.to_vec()
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        #[derive(serde::Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        let input = self.prepare_inputs(texts);
        let body = EmbedRequest {
            model: &self.cfg.model,
            input: &input,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/embeddings", self.cfg.base_url))
            .json(&body);
        if let Some(key) = &self.cfg.api_key {
            builder = builder.bearer_auth(key);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: EmbeddingApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        Ok(EmbedResponse {
            vectors: parsed.data.into_iter().map(|d| d.embedding).collect(),
        })
    }

    fn model(&self) -> &str {
        &self.cfg.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(model: &str) -> OpenAiProvider {
        OpenAiProvider::new(OpenAiConfig {
            base_url: "http://localhost:1234".to_string(),
            api_key: None,
            model: model.to_string(),
        })
    }

    #[test]
    fn bge_models_get_the_retrieval_prefix() {
        let p = provider("BAAI/bge-small-en-v1.5");
        let inputs = p.prepare_inputs(&["kitchen appliances".to_string()]);
        assert_eq!(
            inputs[0],
            "Represent this sentence for searching relevant passages: kitchen appliances"
        );
    }

    #[test]
    fn other_models_pass_inputs_through() {
        let p = provider("all-MiniLM-L6-v2");
        let inputs = p.prepare_inputs(&["kitchen appliances".to_string()]);
        assert_eq!(inputs[0], "kitchen appliances");
    }
}
