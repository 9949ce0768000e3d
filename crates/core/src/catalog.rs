//! Known-good embedding models and the collections derived from them.

use serde::Serialize;

pub const DEFAULT_MODEL: &str = "BAAI/bge-small-en-v1.5";

/// Base name for per-model collections in the vector store.
const COLLECTION_PREFIX: &str = "merchant_categories";

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub dimension: usize,
    pub description: &'static str,
    pub speed: &'static str,
    pub quality: &'static str,
}

static MODELS: [ModelInfo; 7] = [
    ModelInfo {
        name: "all-MiniLM-L6-v2",
        dimension: 384,
        description: "Fast general-purpose model with decent performance",
        speed: "Very Fast",
        quality: "Good",
    },
    ModelInfo {
        name: "BAAI/bge-small-en-v1.5",
        dimension: 384,
        description: "Small BGE model optimized for search with excellent performance",
        speed: "Fast",
        quality: "Very Good",
    },
    ModelInfo {
        name: "BAAI/bge-base-en-v1.5",
        dimension: 768,
        description: "Base BGE model with superior search performance",
        speed: "Medium",
        quality: "Excellent",
    },
    ModelInfo {
        name: "intfloat/e5-small-v2",
        dimension: 384,
        description: "Small E5 model with strong performance on diverse queries",
        speed: "Fast",
        quality: "Very Good",
    },
    ModelInfo {
        name: "sentence-transformers/all-mpnet-base-v2",
        dimension: 768,
        description: "High quality general purpose model",
        speed: "Medium",
        quality: "Excellent",
    },
    ModelInfo {
        name: "sentence-transformers/multi-qa-MiniLM-L6-cos-v1",
        dimension: 384,
        description: "Specialized for question-answering, good for search queries",
        speed: "Fast",
        quality: "Very Good for Q&A",
    },
    ModelInfo {
        name: "sentence-transformers/msmarco-MiniLM-L6-cos-v5",
        dimension: 384,
        description: "Optimized for search queries from Bing",
        speed: "Fast",
        quality: "Very Good for Search",
    },
];

pub fn recommended_models() -> &'static [ModelInfo] {
    &MODELS
}

pub fn model_info(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// Collection name a model's embeddings are loaded into. Slashes in model
/// names are not valid in collection names and are flattened.
pub fn collection_for_model(model: &str) -> String {
    format!("{}_{}", COLLECTION_PREFIX, model.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_flattens_slashes() {
        assert_eq!(
            collection_for_model("BAAI/bge-small-en-v1.5"),
            "merchant_categories_BAAI_bge-small-en-v1.5"
        );
        assert_eq!(
            collection_for_model("all-MiniLM-L6-v2"),
            "merchant_categories_all-MiniLM-L6-v2"
        );
    }

    #[test]
    fn default_model_is_in_the_catalog() {
        assert!(model_info(DEFAULT_MODEL).is_some());
    }
}
