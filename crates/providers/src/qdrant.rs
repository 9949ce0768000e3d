use crate::ProviderError;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
}

/// REST client for a Qdrant server. Collection names are per call; the
/// client itself only carries the endpoint and credentials.
#[derive(Clone)]
pub struct QdrantClient {
    client: Client,
    cfg: QdrantConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Cosine,
    Euclid,
    Dot,
}

impl Distance {
    /// Unrecognized names fall back to cosine.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "euclid" => Distance::Euclid,
            "dot" => Distance::Dot,
            _ => Distance::Cosine,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Euclid => "Euclid",
            Distance::Dot => "Dot",
        }
    }
}

/// Deterministic point key for an external identifier. Qdrant keys are
/// u64 or UUID; a UUIDv5 of the original id keeps the mapping stable and
/// collision-resistant, and the verbatim id travels in the payload as
/// `original_id`.
pub fn point_id(original_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, original_id.as_bytes()).to_string()
}

#[derive(Debug, Serialize)]
pub struct QdrantPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
pub struct CollectionDescription {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub points_count: Option<u64>,
    #[serde(default)]
    config: Option<serde_json::Value>,
}

impl CollectionInfo {
    pub fn vector_size(&self) -> Option<u64> {
        self.config
            .as_ref()?
            .pointer("/params/vectors/size")?
            .as_u64()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: serde_json::Value,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
}

impl QdrantClient {
    pub fn new(cfg: QdrantConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.cfg.api_key {
            builder.header("api-key", key)
        } else {
            builder
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let resp = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        Ok(resp)
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/collections", self.cfg.url);
        let resp = self.send(self.client.get(url)).await?;
        let parsed: Envelope<CollectionsResult> = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(parsed
            .result
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    pub async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, ProviderError> {
        let url = format!("{}/collections/{}", self.cfg.url, collection);
        let resp = self.send(self.client.get(url)).await?;
        let parsed: Envelope<CollectionInfo> = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(parsed.result)
    }

    /// Create a collection unless it already exists. Returns `true` when the
    /// collection was created by this call.
    pub async fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
        distance: Distance,
    ) -> Result<bool, ProviderError> {
        let existing = self.list_collections().await?;
        if existing.iter().any(|name| name == collection) {
            return Ok(false);
        }

        #[derive(Serialize)]
        struct VectorParams {
            size: u64,
            distance: &'static str,
        }
        #[derive(Serialize)]
        struct CreateCollection {
            vectors: VectorParams,
        }

        let url = format!("{}/collections/{}", self.cfg.url, collection);
        let body = CreateCollection {
            vectors: VectorParams {
                size: vector_size,
                distance: distance.as_str(),
            },
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(true)
    }

    /// Returns `false` when the collection did not exist.
    pub async fn delete_collection(&self, collection: &str) -> Result<bool, ProviderError> {
        let url = format!("{}/collections/{}", self.cfg.url, collection);
        let resp = self
            .authed(self.client.delete(url))
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        Ok(true)
    }

    pub async fn upsert(
        &self,
        collection: &str,
        points: Vec<QdrantPoint>,
    ) -> Result<(), ProviderError> {
        #[derive(Serialize)]
        struct UpsertPoints {
            points: Vec<QdrantPoint>,
        }

        let url = format!(
            "{}/collections/{}/points?wait=true",
            self.cfg.url, collection
        );
        let body = UpsertPoints { points };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        #[derive(Serialize)]
        struct SearchRequest {
            vector: Vec<f32>,
            limit: u64,
            with_payload: bool,
            with_vector: bool,
        }

        let url = format!(
            "{}/collections/{}/points/search",
            self.cfg.url, collection
        );
        let body = SearchRequest {
            vector,
            limit,
            with_payload: true,
            with_vector: false,
        };
        let resp = self.send(self.client.post(url).json(&body)).await?;
        let parsed: Envelope<Vec<SearchResult>> = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_deterministic_and_distinct() {
        assert_eq!(point_id("5181"), point_id("5181"));
        assert_ne!(point_id("5181"), point_id("5182"));
        // Valid UUID, acceptable to the store as a native key.
        assert!(Uuid::parse_str(&point_id("5181")).is_ok());
    }

    #[test]
    fn distance_parsing_defaults_to_cosine() {
        assert_eq!(Distance::parse("cosine"), Distance::Cosine);
        assert_eq!(Distance::parse("Euclid"), Distance::Euclid);
        assert_eq!(Distance::parse("DOT"), Distance::Dot);
        assert_eq!(Distance::parse("manhattan"), Distance::Cosine);
    }

    #[test]
    fn collection_info_reads_vector_size_from_config() {
        let info: CollectionInfo = serde_json::from_value(serde_json::json!({
            "points_count": 12,
            "config": {"params": {"vectors": {"size": 384, "distance": "Cosine"}}}
        }))
        .unwrap();
        assert_eq!(info.points_count, Some(12));
        assert_eq!(info.vector_size(), Some(384));
    }
}
